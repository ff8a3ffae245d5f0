use std::rc::Rc;
use yew::prelude::*;
use gloo_timers::callback::Interval;
use shared::{category_standings, models::*};
use crate::{api, styles::*};

const REFRESH_INTERVAL_MS: u32 = 15_000;

#[derive(Clone, Default, PartialEq)]
pub struct LeaderboardState {
    categories: Vec<Category>,
    nominees: Vec<Nominee>,
    entries: Vec<LeaderboardEntry>,
    loaded: bool,
    error: Option<String>,
}

pub enum Msg {
    Catalog(Vec<Category>, Vec<Nominee>),
    Entries(Vec<LeaderboardEntry>),
    Error(String),
}

impl Reducible for LeaderboardState {
    type Action = Msg;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            Msg::Catalog(categories, nominees) => {
                next.categories = categories;
                next.nominees = nominees;
            }
            Msg::Entries(entries) => {
                next.entries = entries;
                next.loaded = true;
                next.error = None;
            }
            Msg::Error(error) => {
                next.loaded = true;
                next.error = Some(error);
            }
        }
        Rc::new(next)
    }
}

fn refresh_entries(state: UseReducerHandle<LeaderboardState>) {
    wasm_bindgen_futures::spawn_local(async move {
        match api::fetch_leaderboard().await {
            Ok(entries) => state.dispatch(Msg::Entries(entries)),
            Err(e) => state.dispatch(Msg::Error(e.to_string())),
        }
    });
}

#[function_component]
pub fn Leaderboard() -> Html {
    let state = use_reducer(LeaderboardState::default);

    use_effect_with_deps({
        let state = state.clone();
        move |_| {
            let catalog_state = state.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let catalog = async {
                    Ok::<_, shared::Error>((api::fetch_categories().await?, api::fetch_nominees().await?))
                }
                .await;
                match catalog {
                    Ok((categories, nominees)) => catalog_state.dispatch(Msg::Catalog(categories, nominees)),
                    Err(e) => catalog_state.dispatch(Msg::Error(e.to_string())),
                }
            });

            refresh_entries(state.clone());
            let interval = Interval::new(REFRESH_INTERVAL_MS, move || refresh_entries(state.clone()));
            move || drop(interval)
        }
    }, ());

    html! {
        <div class={CONTAINER}>
            <h1 class={combine_classes(HEADING_LG, "text-white")}>{"Leaderboard"}</h1>

            {if let Some(error) = &state.error {
                html! { <div class={alert_style("error")}>{error}</div> }
            } else { html! {} }}

            <div class={SPACE_Y_LG}>
                {for state.categories.iter().map(|category| {
                    let standings = category_standings(category, &state.nominees, &state.entries);
                    html! {
                        <section class={CARD_SECTION} key={category.id.clone()}>
                            <h2 class={HEADING_SM}>{format!("{} {}", category.icon, category.name)}</h2>
                            <div class={SPACE_Y_BASE}>
                                {for standings.iter().enumerate().map(|(rank, standing)| html! {
                                    <div key={standing.nominee_id.clone()}>
                                        <div class={FLEX_BETWEEN}>
                                            <span class={classes!("font-medium", if rank == 0 && standing.votes > 0 { "text-amber-400" } else { "text-gray-100" })}>
                                                {format!("{}. {}", rank + 1, standing.name)}
                                            </span>
                                            <span class={TEXT_MUTED}>
                                                {format!("{} votes ({:.1}%)", standing.votes, standing.share * 100.0)}
                                            </span>
                                        </div>
                                        <div class="w-full bg-gray-700 rounded-full h-2 mt-1">
                                            <div class="bg-amber-400 h-2 rounded-full"
                                                style={format!("width: {:.1}%", standing.share * 100.0)}></div>
                                        </div>
                                    </div>
                                })}
                            </div>
                        </section>
                    }
                })}
            </div>

            {if !state.loaded {
                html! {
                    <div class="flex justify-center p-8">
                        <div class={combine_classes("animate-pulse", TEXT_MUTED)}>{"Loading results..."}</div>
                    </div>
                }
            } else { html! {} }}
        </div>
    }
}
