use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{OutlineView, PlayerView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", PlayerView)] Lesson {},
        #[route("/outline", OutlineView)] Outline {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Lessons" }
            ul {
                li { Link { to: Route::Lesson {}, "Lesson" } }
                li { Link { to: Route::Outline {}, "Outline" } }
            }
        }
    }
}
