use crate::app::{AppModel, Update};
use crate::events::AppEvent;
use crate::sys::ticker;
use async_channel::{Receiver, Sender};
use psalter::VerseLookup;
use std::io::Write;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

/// The current-thread runtime the frame loop and verse lookups share.
pub fn build() -> std::io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}

/// Drives the frame loop on `rt` until Ctrl-C.
///
/// Verse lookups spawned by the coordinator share this thread, so every
/// mutation of the model happens between awaits of the event loop.
pub fn run<S: VerseLookup>(
    rt: &Runtime,
    mut app: AppModel<S>,
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
    frame_interval: Duration,
) -> anyhow::Result<()> {
    rt.block_on(async move {
        {
            let tx = tx.clone();
            tokio::spawn(async move {
                ticker::run_ticker(tx, frame_interval).await;
            });
        }

        {
            let tx = tx.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        let _ = tx.send(AppEvent::Shutdown).await;
                    }
                    Err(e) => log::error!("Failed to listen for Ctrl-C: {}", e),
                }
            });
        }

        if let Some(subtitle) = app.coordinator().subtitle() {
            println!("{}", subtitle);
        }

        while let Ok(event) = rx.recv().await {
            let update = app.update(event);
            if update.quit {
                break;
            }
            if let Err(e) = present(&app, update) {
                log::error!("Failed to write output: {}", e);
                break;
            }
        }
    });

    Ok(())
}

fn present<S: VerseLookup>(app: &AppModel<S>, update: Update) -> std::io::Result<()> {
    if !update.labels_changed && !update.panel_changed {
        return Ok(());
    }

    let mut out = std::io::stdout().lock();
    if update.labels_changed {
        writeln!(out, "{}", app.labels())?;
    }
    if update.panel_changed {
        writeln!(out, "{}", app.panel())?;
    }
    out.flush()
}
