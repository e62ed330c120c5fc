//! Terminal front-end over the same listing controller the web views use.

mod app;
mod terminal;
mod ui;

use std::sync::Arc;

use crate::{
    api::PostsApi,
    search::{ControllerOptions, SearchController},
};

use app::{Action, App};

const DELETE_ERROR: &str = "Failed to delete post. Please try again.";
const LOAD_POST_ERROR: &str = "Failed to load post. Please try again later.";

pub async fn run(
    api: Arc<dyn PostsApi>,
    options: ControllerOptions,
    initial_query: Option<String>,
) -> crate::Result<()> {
    let mut controller = SearchController::new(api.clone(), options);
    if let Some(query) = initial_query.as_deref() {
        controller = controller.with_query(query);
    }
    let mut updates = controller.subscribe();
    controller.load();

    let mut app = App::new(controller);
    let mut keys = terminal::spawn_input_reader();
    let mut tui = terminal::Tui::start()?;

    while !app.should_quit {
        tui.draw(|f| ui::render(f, &app))?;

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                app.set_state(state);
            }
            key = keys.recv() => {
                let Some(key) = key else {
                    break;
                };
                if let Some(action) = app.handle_key(key) {
                    perform(api.as_ref(), &mut app, action).await;
                }
            }
        }
    }

    Ok(())
}

async fn perform(api: &dyn PostsApi, app: &mut App, action: Action) {
    match action {
        Action::Open(id) => match api.get_post(id).await {
            Ok(post) => {
                app.status = None;
                app.show_detail(post);
            }
            Err(e) => {
                tracing::warn!("Loading post {} failed: {}", id, e);
                app.status = Some(e.user_message(LOAD_POST_ERROR));
            }
        },
        Action::Delete(id) => match api.delete_post(id).await {
            Ok(()) => app.after_delete(),
            Err(e) => {
                tracing::warn!("Deleting post {} failed: {}", id, e);
                app.status = Some(DELETE_ERROR.to_string());
            }
        },
    }
}
