//! Demo worker: greets, counts ticks and answers a couple of console commands.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use plugvisor::{Worker, WorkerContext, WorkerError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

const TICK: Duration = Duration::from_secs(5);

#[derive(Default)]
pub struct HelloWorld {
    stopping: AtomicBool,
    wake: Notify,
    ticks: AtomicU64,
}

#[async_trait]
impl Worker for HelloWorld {
    async fn initialize(&self, ctx: &WorkerContext) -> Result<(), WorkerError> {
        match ctx.parameter() {
            Some(p) => ctx.log(format!("Hello world, started with parameters '{p}'")),
            None => ctx.log("Hello world"),
        }
        ctx.set_status("Initialized");
        Ok(())
    }

    async fn run(&self, ctx: WorkerContext, token: CancellationToken) -> Result<(), WorkerError> {
        ctx.set_status("Running");
        while !self.stopping.load(Ordering::Acquire) {
            tokio::select! {
                _ = token.cancelled() => return Err(WorkerError::Canceled),
                _ = self.wake.notified() => {}
                _ = tokio::time::sleep(TICK) => {
                    let n = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
                    ctx.publish_stat("Ticks", n);
                    ctx.debug(format!("tick {n}"));
                }
            }
        }
        ctx.log("Goodbye");
        Ok(())
    }

    async fn stop(&self) -> Result<(), WorkerError> {
        self.stopping.store(true, Ordering::Release);
        self.wake.notify_one();
        Ok(())
    }

    async fn on_command(&self, ctx: &WorkerContext, command: &str) -> Result<(), WorkerError> {
        match command.to_ascii_lowercase().as_str() {
            "status" => {
                ctx.log(format!("{} ticks so far", self.ticks.load(Ordering::Relaxed)));
                Ok(())
            }
            "bye" => {
                ctx.log("Leaving on request");
                ctx.request_quit();
                Ok(())
            }
            "fail" => Err(WorkerError::fail("requested failure")),
            _ => {
                ctx.log(format!(
                    "Unknown command '{command}'; try 'status', 'bye', 'fail' or 'Help!'"
                ));
                Ok(())
            }
        }
    }

    async fn on_hourly(&self, ctx: &WorkerContext) -> Result<(), WorkerError> {
        ctx.log("Another hour has passed");
        Ok(())
    }

    async fn on_daily(&self, ctx: &WorkerContext) -> Result<(), WorkerError> {
        self.ticks.store(0, Ordering::Relaxed);
        ctx.log("New day, tick counter reset");
        Ok(())
    }
}
