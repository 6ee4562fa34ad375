//! Shortest-path search panel fed by the streaming path client.

use std::sync::Arc;

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, warn};

use super::article_link;
use crate::error::WikiGraphError;
use crate::path::{PathClient, StreamData};

/// Start and end inputs plus live progress of the search. Results arrive
/// record by record; a new search replaces the running one.
#[component]
pub fn PathSearch(client: Arc<PathClient>, #[prop(into)] wiki: String) -> impl IntoView {
	let (start, set_start) = signal(String::new());
	let (end, set_end) = signal(String::new());
	let progress = RwSignal::new(StreamData::default());
	let error = RwSignal::new(None::<String>);
	let running = RwSignal::new(false);

	let wiki_submit = wiki.clone();
	let on_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		let (from, to) = (start.get_untracked(), end.get_untracked());
		if from.trim().is_empty() || to.trim().is_empty() {
			return;
		}
		let (client, wiki) = (client.clone(), wiki_submit.clone());
		progress.set(StreamData::default());
		error.set(None);
		running.set(true);
		spawn_local(async move {
			match client.run(&wiki, &from, &to, |data| progress.set(data.clone())).await {
				Ok(last) => {
					progress.set(last);
					running.set(false);
				}
				Err(WikiGraphError::Cancelled) => {
					debug!("wiki-graph: path search {from:?} -> {to:?} superseded")
				}
				Err(e) => {
					warn!("wiki-graph: path search failed: {e}");
					error.set(Some(e.to_string()));
					running.set(false);
				}
			}
		});
	};

	view! {
		<form class="path-search" on:submit=on_submit>
			<input
				type="text"
				placeholder="Start page"
				prop:value=move || start.get()
				on:input=move |ev| set_start.set(event_target_value(&ev))
			/>
			<input
				type="text"
				placeholder="End page"
				prop:value=move || end.get()
				on:input=move |ev| set_end.set(event_target_value(&ev))
			/>
			<button type="submit">"Find path"</button>
		</form>
		<div class="path-progress">
			<Show when=move || running.get() || progress.with(|p| p.visited > 0)>
				<p>
					{move || {
						progress.with(|p| format!("{} pages visited in {} ms", p.visited, p.elapsed_ms))
					}}
				</p>
			</Show>
			<Show when=move || error.with(Option::is_some)>
				<p class="error">{move || error.get().unwrap_or_default()}</p>
			</Show>
			<ol class="paths">
				{move || {
					let wiki = wiki.clone();
					progress
						.with(|p| {
							p.paths
								.iter()
								.flatten()
								.map(|path| {
									let steps = path
										.iter()
										.enumerate()
										.map(|(i, title)| {
											view! {
												{(i > 0).then_some(" → ")}
												{article_link(&wiki, title)}
											}
										})
										.collect_view();
									view! { <li>{steps}</li> }
								})
								.collect_view()
						})
				}}
			</ol>
		</div>
	}
}
