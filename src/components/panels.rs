//! Overlay panels around the graph: settings, search, communities and the
//! current selection.

use leptos::ev::{MouseEvent, SubmitEvent};
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, warn};

use super::article_link;
use crate::api::{LinkDirection, LinkEntry, LinkQuery, WikiApi, page_count};
use crate::error::WikiGraphError;
use crate::explore::{SharedGraph, lock_graph};
use crate::graph::Cluster;
use crate::selection::SelectionState;
use crate::settings::{RenderSettings, SettingsChange, SizeOption};

/// Numeric input bound to one settings field.
#[component]
fn NumberField(
	label: &'static str,
	#[prop(into)] value: Signal<String>,
	min: &'static str,
	on_input: impl Fn(String) + 'static,
) -> impl IntoView {
	view! {
		<label class="settings-field">
			<span>{label}</span>
			<input
				type="number"
				min=min
				prop:value=move || value.get()
				on:change=move |ev| on_input(event_target_value(&ev))
			/>
		</label>
	}
}

/// Editor for [`RenderSettings`]. Every edit goes through `on_change`.
#[component]
pub fn SettingsPanel(
	settings: RwSignal<RenderSettings>,
	on_change: Callback<SettingsChange>,
	#[prop(default = true)] expandable: bool,
) -> impl IntoView {
	let parsed = move |raw: String, make: fn(f64) -> SettingsChange| match raw.trim().parse::<f64>() {
		Ok(v) => on_change.run(make(v)),
		Err(_) => debug!("wiki-graph: ignoring non-numeric input {raw:?}"),
	};

	let on_size_by = move |raw: String| match raw.parse::<SizeOption>() {
		Ok(option) => on_change.run(SettingsChange::SizeBy(option)),
		Err(e) => warn!("wiki-graph: {e}"),
	};

	view! {
		<div class="settings-panel">
			<Show when=move || expandable>
				<NumberField
					label="Neighbours"
					min="1"
					value=Signal::derive(move || settings.with(|s| s.neighbors.to_string()))
					on_input=move |raw| parsed(raw, |v| SettingsChange::Neighbors(v as usize))
				/>
				<NumberField
					label="Depth"
					min="1"
					value=Signal::derive(move || settings.with(|s| s.depth.to_string()))
					on_input=move |raw| parsed(raw, |v| SettingsChange::Depth(v as u32))
				/>
			</Show>
			<NumberField
				label="Min size"
				min="0"
				value=Signal::derive(move || settings.with(|s| s.min_size.to_string()))
				on_input=move |raw| parsed(raw, SettingsChange::MinSize)
			/>
			<NumberField
				label="Max size"
				min="0"
				value=Signal::derive(move || settings.with(|s| s.max_size.to_string()))
				on_input=move |raw| parsed(raw, SettingsChange::MaxSize)
			/>
			<label class="settings-field">
				<span>"Size by"</span>
				<select on:change=move |ev| on_size_by(event_target_value(&ev))>
					{move || {
						settings
							.with(|s| {
								s.possible_size_options
									.iter()
									.map(|(option, label)| {
										view! {
											<option value=option.attr_name() selected=*option == s.size_by>
												{label.clone()}
											</option>
										}
									})
									.collect_view()
							})
					}}
				</select>
			</label>
		</div>
	}
}

/// Label search with suggestions; a submitted label is emphasised in the view.
#[component]
pub fn SearchPanel(graph: SharedGraph, selection: RwSignal<SelectionState>) -> impl IntoView {
	let on_input = move |query: String| {
		let mut sel = selection.get_untracked();
		sel.set_query(&lock_graph(&graph), &query);
		selection.set(sel);
	};

	let on_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		selection.update(|sel| {
			if !sel.submit_search() {
				debug!("wiki-graph: no node labelled {:?}", sel.search_query);
			}
		});
	};

	view! {
		<form class="search-panel" on:submit=on_submit>
			<input
				type="search"
				placeholder="Search page"
				list="node-suggestions"
				class=("not-found", move || selection.with(|s| s.not_found))
				prop:value=move || selection.with(|s| s.search_query.clone())
				on:input=move |ev| on_input(event_target_value(&ev))
			/>
			<datalist id="node-suggestions">
				{move || {
					selection
						.with(|s| {
							s.suggestions
								.iter()
								.map(|label| view! { <option value=label.clone() /> })
								.collect_view()
						})
				}}
			</datalist>
			<Show when=move || selection.with(|s| s.not_found)>
				<p class="hint">"Page not in graph"</p>
			</Show>
		</form>
	}
}

/// Community list of a bulk-loaded graph; clicking one focuses it.
#[component]
pub fn ClusterPanel(
	#[prop(into)] clusters: Signal<Vec<Cluster>>,
	selection: RwSignal<SelectionState>,
) -> impl IntoView {
	view! {
		<div class="cluster-panel">
			<ul>
				<For
					each=move || clusters.get()
					key=|cluster| cluster.id.clone()
					children=move |cluster| {
						let id = cluster.id.clone();
						let active_id = cluster.id.clone();
						let active = move || {
							selection.with(|s| s.selected_cluster.as_deref() == Some(active_id.as_str()))
						};
						view! {
							<li
								class=("active", active)
								on:click=move |_| selection.update(|s| s.select_cluster(Some(&id)))
							>
								<span class="swatch" style:background-color=cluster.color.clone()></span>
								{format!("{} ({})", cluster.id, cluster.num_nodes)}
							</li>
						}
					}
				/>
			</ul>
			<button on:click=move |_| selection.update(|s| s.select_cluster(None))>"Show all"</button>
		</div>
	}
}

/// The selected node, its degree and a paged list of the pages it links to
/// or is linked from, with a way back to the full graph.
#[component]
pub fn SelectionInfo(
	graph: SharedGraph,
	selection: RwSignal<SelectionState>,
	api: WikiApi,
	#[prop(into)] wiki: String,
) -> impl IntoView {
	let query = RwSignal::new(None::<LinkQuery>);
	let total = RwSignal::new(None::<u64>);
	let entries = RwSignal::new(Vec::<LinkEntry>::new());
	let failure = RwSignal::new(None::<String>);

	let selected = Memo::new(move |_| selection.with(|s| s.selected_node.clone()));
	let graph_title = graph.clone();
	Effect::new(move |_| {
		let Some(key) = selected.get() else {
			query.set(None);
			return;
		};
		let page = lock_graph(&graph_title).node(&key).map_or(key, |attrs| attrs.label.clone());
		let direction = query.with_untracked(|q| q.as_ref().map_or(LinkDirection::Outbound, |q| q.direction));
		query.set(Some(LinkQuery::new(page, direction)));
	});

	let wiki_fetch = wiki.clone();
	Effect::new(move |_| {
		let Some(q) = query.get() else {
			total.set(None);
			entries.set(Vec::new());
			return;
		};
		let (api, wiki) = (api.clone(), wiki_fetch.clone());
		failure.set(None);
		spawn_local(async move {
			let listed = async {
				let count = api.count(&wiki, &q.page, q.direction).await?;
				let rows = api.entries(&wiki, &q.page, q.direction, q.page_no).await?;
				Ok::<_, WikiGraphError>((count, rows))
			}
			.await;
			if query.try_get_untracked().flatten().as_ref() != Some(&q) {
				debug!("wiki-graph: dropping stale link list of {:?}", q.page);
				return;
			}
			match listed {
				Ok((count, rows)) => {
					total.set(Some(count));
					entries.set(rows);
				}
				Err(e) => {
					warn!("wiki-graph: listing links of {:?} failed: {e}", q.page);
					total.set(None);
					entries.set(Vec::new());
					failure.set(Some(e.to_string()));
				}
			}
		});
	});

	let on_reset = move |_: MouseEvent| {
		let mut sel = selection.get_untracked();
		sel.deselect(&lock_graph(&graph));
		selection.set(sel);
	};
	let turn = move |direction: LinkDirection| {
		query.update(|q| {
			if let Some(current) = q {
				*current = current.turned(direction);
			}
		});
	};
	let step = move |forward: bool| {
		let count = total.get_untracked().unwrap_or(0);
		query.update(|q| {
			let moved = q
				.as_ref()
				.and_then(|current| if forward { current.next(count) } else { current.previous() });
			if moved.is_some() {
				*q = moved;
			}
		});
	};
	let can_step = move |forward: bool| {
		query.with(|q| {
			q.as_ref().is_some_and(|current| {
				if forward {
					current.next(total.get().unwrap_or(0)).is_some()
				} else {
					current.previous().is_some()
				}
			})
		})
	};
	let wiki = StoredValue::new(wiki);

	view! {
		<Show when=move || selection.with(|s| s.selected_node.is_some())>
			<div class="selection-info">
				<strong>{move || selection.with(|s| s.selected_node.clone().unwrap_or_default())}</strong>
				<span>
					{move || {
						selection
							.with(|s| {
								format!(
									"{} neighbours",
									s.selected_neighbors.as_ref().map_or(0, |n| n.len()),
								)
							})
					}}
				</span>
				<button on:click=on_reset.clone()>"Reset"</button>
				<div class="link-tabs">
					{[LinkDirection::Outbound, LinkDirection::Inbound]
						.into_iter()
						.map(|direction| {
							let active = move || {
								query.with(|q| q.as_ref().is_some_and(|q| q.direction == direction))
							};
							view! {
								<button class=("active", active) on:click=move |_| turn(direction)>
									{direction.label()}
								</button>
							}
						})
						.collect_view()}
				</div>
				<span class="link-total">
					{move || total.get().map(|n| format!("{n} pages")).unwrap_or_default()}
				</span>
				<ul class="link-list">
					{move || {
						let outbound = query.with(|q| q.as_ref().is_none_or(|q| q.direction.is_outbound()));
						entries
							.with(|rows| {
								rows.iter()
									.map(|entry| {
										let shown = match &entry.page_title {
											Some(title) => wiki.with_value(|w| article_link(w, title)),
											None => view! { <span>{entry.display_title(outbound)}</span> }.into_any(),
										};
										view! { <li>{shown}</li> }
									})
									.collect_view()
							})
					}}
				</ul>
				<div class="pager">
					<button disabled=move || !can_step(false) on:click=move |_| step(false)>
						"Previous"
					</button>
					<span>
						{move || {
							let pages = page_count(total.get().unwrap_or(0));
							query.with(|q| q.as_ref().map_or(String::new(), |q| format!("{} / {pages}", q.page_no)))
						}}
					</span>
					<button disabled=move || !can_step(true) on:click=move |_| step(true)>
						"Next"
					</button>
				</div>
				<Show when=move || failure.with(Option::is_some)>
					<p class="status">{move || failure.get().unwrap_or_default()}</p>
				</Show>
			</div>
		</Show>
	}
}
