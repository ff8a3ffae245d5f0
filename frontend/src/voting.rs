use std::{collections::HashSet, rc::Rc};
use yew::prelude::*;
use web_sys::{console, HtmlInputElement};
use shared::{models::*, validate_user_id, LoadOutcome, VotingProgress};
use crate::{
    api::{self, HttpVoteService},
    storage,
    store::{use_vote_store, VoteStoreContext},
    styles::*,
};

#[derive(Clone, Default, PartialEq)]
pub struct CatalogState {
    categories: Vec<Category>,
    nominees: Vec<Nominee>,
    loaded: bool,
    error: Option<String>,
}

pub enum CatalogMsg {
    Received(Vec<Category>, Vec<Nominee>),
    Error(String),
}

impl Reducible for CatalogState {
    type Action = CatalogMsg;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            CatalogMsg::Received(categories, nominees) => {
                next.categories = categories;
                next.nominees = nominees;
                next.loaded = true;
                next.error = None;
            }
            CatalogMsg::Error(error) => {
                next.loaded = true;
                next.error = Some(error);
            }
        }
        Rc::new(next)
    }
}

#[derive(Default, PartialEq)]
struct PendingVotes(HashSet<CategoryId>);

enum PendingMsg {
    Started(CategoryId),
    Finished(CategoryId),
}

impl Reducible for PendingVotes {
    type Action = PendingMsg;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = self.0.clone();
        match action {
            PendingMsg::Started(category_id) => next.insert(category_id),
            PendingMsg::Finished(category_id) => next.remove(&category_id),
        };
        Rc::new(PendingVotes(next))
    }
}

fn load_remote_votes(ctx: VoteStoreContext, loading: UseStateHandle<bool>, user_id: String) {
    loading.set(true);
    wasm_bindgen_futures::spawn_local(async move {
        let service = HttpVoteService::default();
        match ctx.store.load_votes_from_db(&service, &user_id).await {
            LoadOutcome::Applied { votes } => {
                console::log_1(&format!("Loaded {} votes for {}", votes, user_id).into());
            }
            LoadOutcome::Stale => {}
            LoadOutcome::Failed => {
                console::warn_1(&format!("Could not load votes for {}", user_id).into());
            }
        }
        loading.set(ctx.store.is_loading());
        ctx.changed();
    });
}

#[derive(Properties, PartialEq)]
struct SessionBarProps {
    voter: Option<String>,
    on_sign_in: Callback<String>,
    on_sign_out: Callback<()>,
}

#[function_component(SessionBar)]
fn session_bar(props: &SessionBarProps) -> Html {
    let input = use_state(String::new);
    let error = use_state(|| None::<String>);

    if let Some(voter) = &props.voter {
        let on_sign_out = props.on_sign_out.clone();
        return html! {
            <div class={combine_classes(CARD_SECTION, FLEX_BETWEEN)}>
                <span class={TEXT_MUTED}>{"Voting as "}<span class="text-gray-100 font-semibold">{voter}</span></span>
                <button class={combine_classes(BUTTON_BASE, BUTTON_DANGER)}
                    onclick={move |_| on_sign_out.emit(())}>
                    {"Sign out"}
                </button>
            </div>
        };
    }

    let oninput = {
        let input = input.clone();
        Callback::from(move |e: InputEvent| {
            input.set(e.target_unchecked_into::<HtmlInputElement>().value());
        })
    };

    let onsubmit = {
        let input = input.clone();
        let error = error.clone();
        let on_sign_in = props.on_sign_in.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let voter = input.trim().to_string();
            match validate_user_id(&voter) {
                Ok(()) => {
                    error.set(None);
                    input.set(String::new());
                    on_sign_in.emit(voter);
                }
                Err(e) => error.set(Some(e.to_string())),
            }
        })
    };

    html! {
        <form class={combine_classes(CARD_SECTION, "flex flex-col gap-2")} {onsubmit}>
            <label class={TEXT_LABEL}>{"Sign in to keep your votes across devices"}</label>
            <div class="flex gap-2">
                <input class={INPUT_BASE} placeholder="Voter id" value={(*input).clone()} {oninput} />
                <button type="submit" class={button_primary(false)}>{"Sign in"}</button>
            </div>
            {if let Some(error) = &*error {
                html! { <p class={TEXT_ERROR}>{error}</p> }
            } else { html! {} }}
        </form>
    }
}

#[function_component]
pub fn Voting() -> Html {
    let ctx = use_vote_store();
    let catalog = use_reducer(CatalogState::default);
    let voter = use_state(storage::voter_id);
    let submitting = use_reducer(PendingVotes::default);
    let loading = use_state(|| false);
    let submit_error = use_state(|| None::<String>);

    use_effect_with_deps({
        let catalog = catalog.clone();
        move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                let result = async {
                    let categories = api::fetch_categories().await?;
                    let nominees = api::fetch_nominees().await?;
                    Ok::<_, shared::Error>((categories, nominees))
                }
                .await;
                match result {
                    Ok((categories, nominees)) => catalog.dispatch(CatalogMsg::Received(categories, nominees)),
                    Err(e) => catalog.dispatch(CatalogMsg::Error(e.to_string())),
                }
            });
            || ()
        }
    }, ());

    // A voter restored from the session gets their remote votes on first render.
    use_effect_with_deps({
        let ctx = ctx.clone();
        let loading = loading.clone();
        let voter = (*voter).clone();
        move |_| {
            if let Some(user_id) = voter {
                load_remote_votes(ctx, loading, user_id);
            }
            || ()
        }
    }, ());

    let on_sign_in = {
        let ctx = ctx.clone();
        let loading = loading.clone();
        let voter = voter.clone();
        Callback::from(move |user_id: String| {
            storage::set_voter_id(Some(&user_id));
            voter.set(Some(user_id.clone()));
            load_remote_votes(ctx.clone(), loading.clone(), user_id);
        })
    };

    let on_sign_out = {
        let ctx = ctx.clone();
        let voter = voter.clone();
        let submit_error = submit_error.clone();
        Callback::from(move |_| {
            storage::set_voter_id(None);
            voter.set(None);
            submit_error.set(None);
            ctx.store.clear_votes();
            ctx.changed();
        })
    };

    let on_vote = {
        let ctx = ctx.clone();
        let voter = voter.clone();
        let submitting = submitting.clone();
        let submit_error = submit_error.clone();
        Callback::from(move |(category_id, nominee_id): (CategoryId, NomineeId)| {
            let Some(user_id) = (*voter).clone() else {
                ctx.store.set_vote(&category_id, &nominee_id);
                ctx.changed();
                return;
            };

            if submitting.0.contains(&category_id) {
                return;
            }
            submitting.dispatch(PendingMsg::Started(category_id.clone()));
            submit_error.set(None);

            let ctx = ctx.clone();
            let submitting = submitting.clone();
            let submit_error = submit_error.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let service = HttpVoteService::default();
                let saved = ctx.store
                    .submit_vote_to_db(&service, &user_id, &category_id, &nominee_id)
                    .await;
                if !saved {
                    submit_error.set(Some("Your vote could not be saved. Please try again.".into()));
                }
                submitting.dispatch(PendingMsg::Finished(category_id));
                ctx.changed();
            });
        })
    };

    let progress = VotingProgress::new(&ctx.store.voted_categories(), &catalog.categories);
    let loading_votes = *loading || ctx.store.is_loading();

    html! {
        <div class={CONTAINER}>
            <h1 class={combine_classes(HEADING_LG, "text-white")}>{"Cast Your Votes"}</h1>

            <div class={SPACE_Y_LG}>
                <SessionBar voter={(*voter).clone()} {on_sign_in} {on_sign_out} />

                <div class={combine_classes(STATS_CARD, if progress.is_complete() { STATS_CARD_SUCCESS } else { STATS_CARD_INFO })}>
                    <div class={FLEX_BETWEEN}>
                        <span>{format!("{} of {} categories voted", progress.voted_count, progress.total)}</span>
                        <span class="font-semibold">{format!("{:.0}%", progress.percentage())}</span>
                    </div>
                    <div class="w-full bg-gray-700 rounded-full h-2 mt-2">
                        <div class="bg-amber-400 h-2 rounded-full" style={format!("width: {:.1}%", progress.percentage())}></div>
                    </div>
                </div>

                {if loading_votes {
                    html! { <div class={combine_classes("animate-pulse", TEXT_MUTED)}>{"Loading your saved votes..."}</div> }
                } else { html! {} }}

                {if let Some(error) = &*submit_error {
                    html! { <div class={alert_style("error")}>{error}</div> }
                } else { html! {} }}

                {if let Some(error) = &catalog.error {
                    html! { <div class={alert_style("error")}>{error}</div> }
                } else { html! {} }}

                {for catalog.categories.iter().map(|category| {
                    let selected = ctx.store.get_vote(&category.id);
                    let busy = submitting.0.contains(&category.id);
                    html! {
                        <section class={CARD_SECTION} key={category.id.clone()}>
                            <div class={FLEX_BETWEEN}>
                                <h2 class={HEADING_SM}>{format!("{} {}", category.icon, category.name)}</h2>
                                {if progress.has_voted(&category.id) {
                                    html! { <span class="text-green-400 text-sm font-semibold">{"Voted"}</span> }
                                } else { html! {} }}
                            </div>
                            <p class={combine_classes(TEXT_MUTED, "mb-3")}>{&category.description}</p>
                            <div class="grid gap-3 md:grid-cols-2">
                                {for catalog.nominees.iter().filter(|n| n.category_id == category.id).map(|nominee| {
                                    let chosen = selected.as_deref() == Some(nominee.id.as_str());
                                    let onclick = {
                                        let on_vote = on_vote.clone();
                                        let pick = (category.id.clone(), nominee.id.clone());
                                        move |_| on_vote.emit(pick.clone())
                                    };
                                    html! {
                                        <button key={nominee.id.clone()} disabled={busy} {onclick}
                                            class={classes!(
                                                "flex", "items-center", "gap-3", "p-3", "rounded-lg", "border", "text-left",
                                                "transition-colors", "duration-150", "disabled:opacity-50",
                                                if chosen { "border-amber-400 bg-gray-700" } else { "border-gray-700 hover:border-gray-500" }
                                            )}>
                                            <img src={nominee.image_url.clone()} alt={nominee.name.clone()} class="w-12 h-12 rounded object-cover" />
                                            <div>
                                                <div class="text-gray-100 font-medium">{&nominee.name}</div>
                                                <div class={TEXT_MUTED}>{&nominee.description}</div>
                                            </div>
                                        </button>
                                    }
                                })}
                            </div>
                        </section>
                    }
                })}

                {if !catalog.loaded {
                    html! {
                        <div class="flex justify-center p-8">
                            <div class={combine_classes("animate-pulse", TEXT_MUTED)}>{"Loading categories..."}</div>
                        </div>
                    }
                } else { html! {} }}
            </div>
        </div>
    }
}
