use std::thread;

use engine_logging::{engine_info, engine_warn};
use fotodown_engine::CancellationToken;

/// Cancel `token` on the first Ctrl-C.
///
/// The listener runs on its own thread so the main thread can keep polling
/// engine events. It exits quietly once the token is cancelled elsewhere.
pub fn cancel_on_ctrl_c(token: CancellationToken) {
    let spawned = thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_warn!("Ctrl-C handling unavailable: {}", err);
                    return;
                }
            };
            runtime.block_on(async {
                tokio::select! {
                    _ = token.cancelled() => {}
                    signalled = tokio::signal::ctrl_c() => match signalled {
                        Ok(()) => {
                            engine_info!("Interrupted, stopping after the current requests");
                            token.cancel();
                        }
                        Err(err) => engine_warn!("Could not listen for Ctrl-C: {}", err),
                    },
                }
            });
        });
    if let Err(err) = spawned {
        engine_warn!("Ctrl-C handling unavailable: {}", err);
    }
}
