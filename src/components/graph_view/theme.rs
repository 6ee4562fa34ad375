//! Light and dark styling for the graph canvas.
//!
//! The active [`ThemeMode`] is passed to the renderer explicitly; nothing here
//! reads global state.

use serde::Deserialize;

/// User-selected color scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
	#[default]
	/// Dark background, light labels.
	Dark,
	/// Light background, dark labels.
	Light,
}

impl ThemeMode {
	/// The other mode.
	pub fn toggled(self) -> Self {
		match self {
			ThemeMode::Dark => ThemeMode::Light,
			ThemeMode::Light => ThemeMode::Dark,
		}
	}

	/// Value for the document's `data-theme` attribute.
	pub fn as_str(self) -> &'static str {
		match self {
			ThemeMode::Dark => "dark",
			ThemeMode::Light => "light",
		}
	}
}

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha in `[0, 1]`.
	pub a: f64,
}

/// CSS color keywords understood by [`Color::parse`], lowercase.
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
	("black", (0, 0, 0)),
	("silver", (192, 192, 192)),
	("gray", (128, 128, 128)),
	("grey", (128, 128, 128)),
	("white", (255, 255, 255)),
	("maroon", (128, 0, 0)),
	("red", (255, 0, 0)),
	("purple", (128, 0, 128)),
	("fuchsia", (255, 0, 255)),
	("magenta", (255, 0, 255)),
	("green", (0, 128, 0)),
	("lime", (0, 255, 0)),
	("olive", (128, 128, 0)),
	("yellow", (255, 255, 0)),
	("navy", (0, 0, 128)),
	("blue", (0, 0, 255)),
	("teal", (0, 128, 128)),
	("aqua", (0, 255, 255)),
	("cyan", (0, 255, 255)),
	("orange", (255, 165, 0)),
	("pink", (255, 192, 203)),
	("brown", (165, 42, 42)),
	("gold", (255, 215, 0)),
	("lightgray", (211, 211, 211)),
	("lightgrey", (211, 211, 211)),
	("darkgray", (169, 169, 169)),
	("darkgrey", (169, 169, 169)),
	("dimgray", (105, 105, 105)),
	("steelblue", (70, 130, 180)),
];

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with alpha `a`.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Parses `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`/`rgba()`, the CSS basic
	/// color keywords and a few common extended ones. Anything else is mid gray.
	pub fn parse(css: &str) -> Self {
		let css = css.trim();
		if let Some(hex) = css.strip_prefix('#') {
			let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(128);
			return match hex.len() {
				_ if !hex.is_ascii() => Self::rgb(128, 128, 128),
				3 | 4 => {
					let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).map_or(128, |d| d * 17);
					let a = if hex.len() == 4 { digit(3) as f64 / 255.0 } else { 1.0 };
					Self::rgba(digit(0), digit(1), digit(2), a)
				}
				6 | 8 => {
					let a = if hex.len() == 8 {
						channel(&hex[6..8]) as f64 / 255.0
					} else {
						1.0
					};
					Self::rgba(channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6]), a)
				}
				_ => Self::rgb(128, 128, 128),
			};
		}
		if css.starts_with("rgb") {
			let nums: Vec<&str> = css
				.trim_start_matches("rgba(")
				.trim_start_matches("rgb(")
				.trim_end_matches(')')
				.split(',')
				.collect();
			let channel = |i: usize| nums.get(i).and_then(|s| s.trim().parse().ok()).unwrap_or(128);
			let a = nums.get(3).and_then(|s| s.trim().parse().ok()).unwrap_or(1.0);
			return Self::rgba(channel(0), channel(1), channel(2), a);
		}
		let name = css.to_ascii_lowercase();
		match NAMED_COLORS.iter().find(|(n, _)| *n == name) {
			Some(&(_, (r, g, b))) => Self::rgb(r, g, b),
			None if name == "transparent" => Self::rgba(0, 0, 0, 0.0),
			None => Self::rgb(128, 128, 128),
		}
	}

	/// Same color, alpha replaced.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	/// Hex when opaque, `rgba()` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Canvas styling for one [`ThemeMode`].
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
	/// Mode this palette belongs to.
	pub mode: ThemeMode,
	/// Canvas fill at the edges.
	pub background: Color,
	/// Center color of the radial background gradient.
	pub background_center: Color,
	/// Node label text.
	pub label: Color,
	/// Multiplier on every edge color's alpha.
	pub edge_alpha: f64,
	/// Ring drawn around the hovered and the searched node.
	pub ring: Color,
	/// Radial shading inside nodes.
	pub node_gradient: bool,
}

impl Theme {
	/// Palette of `mode`.
	pub fn for_mode(mode: ThemeMode) -> Self {
		match mode {
			ThemeMode::Dark => Self {
				mode,
				background: Color::rgb(22, 27, 34),
				background_center: Color::rgb(30, 35, 42),
				label: Color::rgb(255, 255, 255),
				edge_alpha: 0.6,
				ring: Color::rgba(255, 255, 255, 0.8),
				node_gradient: true,
			},
			ThemeMode::Light => Self {
				mode,
				background: Color::rgb(246, 247, 249),
				background_center: Color::rgb(255, 255, 255),
				label: Color::rgb(0, 0, 0),
				edge_alpha: 0.5,
				ring: Color::rgba(20, 20, 20, 0.7),
				node_gradient: false,
			},
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::for_mode(ThemeMode::default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_graph_colors() {
		assert_eq!(Color::parse("#003f5c"), Color::rgb(0, 63, 92));
		assert_eq!(Color::parse("#fff"), Color::rgb(255, 255, 255));
		assert_eq!(Color::parse("gray"), Color::rgb(128, 128, 128));
		assert_eq!(Color::parse("red"), Color::rgb(255, 0, 0));
		assert_eq!(Color::parse("rgba(1, 2, 3, 0.5)"), Color::rgba(1, 2, 3, 0.5));
	}

	#[test]
	fn parses_named_colors() {
		assert_eq!(Color::parse("grey"), Color::parse("gray"));
		assert_eq!(Color::parse("Orange"), Color::rgb(255, 165, 0));
		assert_eq!(Color::parse("navy"), Color::rgb(0, 0, 128));
		assert_eq!(Color::parse("LightGray"), Color::rgb(211, 211, 211));
		assert_eq!(Color::parse("transparent").a, 0.0);
		assert_eq!(Color::parse("chartreuse-ish"), Color::rgb(128, 128, 128));
	}

	#[test]
	fn labels_contrast_with_background() {
		assert_eq!(Theme::for_mode(ThemeMode::Dark).label, Color::rgb(255, 255, 255));
		assert_eq!(Theme::for_mode(ThemeMode::Light).label, Color::rgb(0, 0, 0));
		assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
	}
}
