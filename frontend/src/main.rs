use yew::prelude::*;
use yew_router::prelude::*;

mod api;
mod config;
mod events;
mod leaderboard;
mod storage;
mod store;
mod styles;
mod voting;

use crate::{
    events::Events,
    leaderboard::Leaderboard,
    store::{open_vote_store, Revision, VoteStoreContext},
    voting::Voting,
};

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")] Voting,
    #[at("/leaderboard")] Leaderboard,
    #[at("/events")] Events,
    #[not_found]
    #[at("/404")] NotFound,
}

#[derive(Properties, PartialEq)]
struct NavLinkProps {
    to: Route,
    label: &'static str,
}

#[function_component(NavLink)]
fn nav_link(props: &NavLinkProps) -> Html {
    let current_route = use_route::<Route>();

    html! {
        <Link<Route> to={props.to.clone()} classes={classes!(
            "text-base", "md:text-lg", "font-medium", "px-4", "py-2", "rounded-md",
            "transition-colors", "duration-200", "ease-in-out",
            "text-gray-200", "border", "border-transparent", "hover:border-amber-400", "hover:text-amber-400",
            if current_route.as_ref() == Some(&props.to) {
                "text-amber-400 border-amber-400 ring-2 ring-amber-500 ring-offset-1 ring-offset-gray-900"
            } else {
                ""
            }
        )}>
            {props.label}
        </Link<Route>>
    }
}

#[function_component(Navigation)]
fn navigation() -> Html {
    html! {
        <nav class="bg-gray-900 shadow-lg fixed top-0 w-full z-50">
            <div class="container mx-auto px-6 py-4 flex justify-center space-x-8">
                <NavLink to={Route::Voting} label="Vote" />
                <NavLink to={Route::Leaderboard} label="Leaderboard" />
                <NavLink to={Route::Events} label="Events" />
            </div>
        </nav>
    }
}

#[function_component(App)]
fn app() -> Html {
    let store = use_memo(|_| open_vote_store(), ());
    let revision = use_reducer(Revision::default);

    let context = {
        let revision = revision.clone();
        VoteStoreContext::new(
            (*store).clone(),
            revision.0,
            Callback::from(move |_| revision.dispatch(())),
        )
    };

    html! {
        <ContextProvider<VoteStoreContext> {context}>
            <BrowserRouter>
                <div class="min-h-screen bg-gray-900">
                    <Navigation />
                    <div class="pt-16">
                        <Switch<Route> render={switch} />
                    </div>
                </div>
            </BrowserRouter>
        </ContextProvider<VoteStoreContext>>
    }
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Voting => html! { <Voting /> },
        Route::Leaderboard => html! { <Leaderboard /> },
        Route::Events => html! { <Events /> },
        Route::NotFound => html! { <Redirect<Route> to={Route::Voting} /> },
    }
}

fn main() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
