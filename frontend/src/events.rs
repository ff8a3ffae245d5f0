use std::rc::Rc;
use yew::prelude::*;
use web_sys::HtmlInputElement;
use shared::{models::*, validate_reservation};
use crate::{api, styles::*};

#[derive(Clone, Default, PartialEq)]
pub struct EventsState {
    events: Vec<AwardEvent>,
    loaded: bool,
    error: Option<String>,
}

pub enum Msg {
    Received(Vec<AwardEvent>),
    Error(String),
}

impl Reducible for EventsState {
    type Action = Msg;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            Msg::Received(events) => {
                next.events = events;
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

#[derive(Clone, PartialEq)]
enum SubmissionState {
    Ready,
    Submitting,
    Success,
    Error(String),
}

#[derive(Properties, PartialEq)]
struct ReservationFormProps {
    event_title: String,
}

#[function_component(ReservationForm)]
fn reservation_form(props: &ReservationFormProps) -> Html {
    let user_name = use_state(String::new);
    let contact_info = use_state(String::new);
    let submission = use_state(|| SubmissionState::Ready);

    let bind = |handle: &UseStateHandle<String>| {
        let handle = handle.clone();
        Callback::from(move |e: InputEvent| {
            handle.set(e.target_unchecked_into::<HtmlInputElement>().value());
        })
    };

    let onsubmit = {
        let user_name = user_name.clone();
        let contact_info = contact_info.clone();
        let submission = submission.clone();
        let event_title = props.event_title.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *submission == SubmissionState::Submitting {
                return;
            }

            let reservation = NewReservation {
                event_title: event_title.clone(),
                user_name: user_name.trim().to_string(),
                contact_info: contact_info.trim().to_string(),
            };
            if let Err(e) = validate_reservation(&reservation) {
                submission.set(SubmissionState::Error(e.to_string()));
                return;
            }

            submission.set(SubmissionState::Submitting);
            let submission = submission.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match api::create_reservation(&reservation).await {
                    Ok(_) => submission.set(SubmissionState::Success),
                    Err(e) => submission.set(SubmissionState::Error(e.message)),
                }
            });
        })
    };

    if *submission == SubmissionState::Success {
        return html! { <div class={alert_style("success")}>{"Your seat is reserved. See you there!"}</div> };
    }

    html! {
        <form class="mt-3 flex flex-col gap-2" {onsubmit}>
            <div class="flex gap-2">
                <div class={INPUT_GROUP}>
                    <label class={TEXT_LABEL_SM}>{"Name"}</label>
                    <input class={INPUT_BASE} value={(*user_name).clone()} oninput={bind(&user_name)} />
                </div>
                <div class={INPUT_GROUP}>
                    <label class={TEXT_LABEL_SM}>{"Email or phone"}</label>
                    <input class={INPUT_BASE} value={(*contact_info).clone()} oninput={bind(&contact_info)} />
                </div>
            </div>
            {if let SubmissionState::Error(error) = &*submission {
                html! { <p class={TEXT_ERROR}>{error}</p> }
            } else { html! {} }}
            <button type="submit" class={combine_classes(BUTTON_BASE, BUTTON_SUCCESS)}
                disabled={*submission == SubmissionState::Submitting}>
                {if *submission == SubmissionState::Submitting { "Reserving..." } else { "Reserve a seat" }}
            </button>
        </form>
    }
}

fn phase_label(phase: EventPhase) -> &'static str {
    match phase {
        EventPhase::PreEvent => "Pre-Event",
        EventPhase::OnEvent => "Award Night",
    }
}

fn render_event(event: &AwardEvent) -> Html {
    let time = match (&event.start_time, &event.end_time) {
        (Some(start), Some(end)) => format!("{} - {}", start, end),
        (Some(start), None) => start.clone(),
        _ => String::new(),
    };

    html! {
        <div class={CARD_SECTION} key={event.id.to_string()}>
            <div class={FLEX_BETWEEN}>
                <h3 class={HEADING_SM}>{&event.title}</h3>
                <span class={TEXT_MUTED}>{format!("{} · {}", event.day_label, event.event_date)}</span>
            </div>
            {if !time.is_empty() { html! { <p class={TEXT_MUTED}>{time}</p> } } else { html! {} }}
            {for event.venue.iter().map(|venue| html! { <p class={TEXT_MUTED}>{"Venue: "}{venue}</p> })}
            {for event.speakers.iter().map(|speakers| html! { <p class={TEXT_MUTED}>{"Speakers: "}{speakers}</p> })}
            {for event.description.iter().map(|description| html! { <p class="text-gray-300 mt-2">{description}</p> })}
            {if event.reservable {
                html! { <ReservationForm event_title={event.title.clone()} /> }
            } else { html! {} }}
        </div>
    }
}

#[function_component]
pub fn Events() -> Html {
    let state = use_reducer(EventsState::default);

    use_effect_with_deps({
        let state = state.clone();
        move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                match api::fetch_events().await {
                    Ok(events) => state.dispatch(Msg::Received(events)),
                    Err(e) => state.dispatch(Msg::Error(e.to_string())),
                }
            });
            || ()
        }
    }, ());

    html! {
        <div class={CONTAINER}>
            <h1 class={combine_classes(HEADING_LG, "text-white")}>{"Events"}</h1>

            {if let Some(error) = &state.error {
                html! { <div class={alert_style("error")}>{error}</div> }
            } else { html! {} }}

            <div class={SPACE_Y_LG}>
                {for [EventPhase::PreEvent, EventPhase::OnEvent].into_iter().map(|phase| {
                    let events: Vec<&AwardEvent> = state.events.iter().filter(|e| e.phase == phase).collect();
                    if events.is_empty() {
                        return html! {};
                    }
                    html! {
                        <section>
                            <h2 class={HEADING_MD}>{phase_label(phase)}</h2>
                            <div class={SPACE_Y_BASE}>
                                {for events.into_iter().map(render_event)}
                            </div>
                        </section>
                    }
                })}
            </div>

            {if state.loaded && state.events.is_empty() && state.error.is_none() {
                html! { <p class={combine_classes(TEXT_MUTED, "text-center")}>{"No events scheduled yet."}</p> }
            } else if !state.loaded {
                html! {
                    <div class="flex justify-center p-8">
                        <div class={combine_classes("animate-pulse", TEXT_MUTED)}>{"Loading events..."}</div>
                    </div>
                }
            } else { html! {} }}
        </div>
    }
}
