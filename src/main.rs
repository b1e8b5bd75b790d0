mod cli;
mod error;
mod files;
mod gallery;
mod lightbox;
mod loader;
mod ui;

use clap::Parser;
use std::process::ExitCode;
use std::sync::{Arc, Condvar, Mutex};
use winit::event_loop::EventLoop;

use crate::cli::Cli;
use crate::lightbox::Lightbox;
use crate::loader::{spawn_decode_workers, LoadState, SharedState, UserEvent};
use crate::ui::state::GalleryState;
use crate::ui::App;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn run(cli: Cli) -> error::Result<()> {
    let items = gallery::enumerate(&cli.sources())?;
    log::info!("Gallery has {} items", items.len());

    let shared: SharedState = Arc::new((
        Mutex::new(LoadState::new(items.len(), cli.thumb_size)),
        Condvar::new(),
    ));

    let num_threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .clamp(2, 8);

    let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;
    let proxy = event_loop.create_proxy();

    // Workers start on thumbnails right away; the lightbox image jumps the queue.
    spawn_decode_workers(Arc::clone(&shared), Arc::clone(&items), proxy, num_threads);

    let lightbox = Lightbox::new(items, cli.lightbox_config());
    let state = GalleryState::new(lightbox, shared, cli.font_size, cli.thumb_size);
    let mut app = App::new(state);

    event_loop.run_app(&mut app)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("lightbox: {}", e);
            ExitCode::FAILURE
        }
    }
}
