//! Input + render schedule: the fast tick that never touches the network

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::model::SharedDisplayBuffer;
use crate::view::{DisplayDevice, Renderer};
use super::input::InputStateMachine;
use super::queue::ActionSender;
use super::RunFlag;

pub struct PanelLoop<D: ?Sized> {
    display: Arc<D>,
    buffer: SharedDisplayBuffer,
    actions: ActionSender,
    /// `None` once the input side has been declared dead
    input: Option<InputStateMachine>,
    renderer: Renderer,
    tick: Duration,
    max_faults: u32,
    faults: u32,
}

impl<D> PanelLoop<D>
where
    D: DisplayDevice + ?Sized + 'static,
{
    pub fn new(
        display: Arc<D>,
        buffer: SharedDisplayBuffer,
        actions: ActionSender,
        input: InputStateMachine,
        renderer: Renderer,
        tick: Duration,
        max_faults: u32,
    ) -> Self {
        Self {
            display,
            buffer,
            actions,
            input: Some(input),
            renderer,
            tick,
            max_faults: max_faults.max(1),
            faults: 0,
        }
    }

    pub fn input_alive(&self) -> bool {
        self.input.is_some()
    }

    pub fn spawn(self, run: RunFlag) -> JoinHandle<()> {
        tokio::spawn(self.run(run))
    }

    pub async fn run(mut self, run: RunFlag) {
        let mut ticker = time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while run.is_running() {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = run.stopped() => break,
            }
            self.step(Instant::now());
        }
        tracing::info!(
            input_alive = self.input_alive(),
            dropped_actions = self.actions.dropped(),
            "Input/render schedule stopped"
        );
    }

    pub fn step(&mut self, now: Instant) {
        self.poll_input(now);
        self.renderer.tick(&self.buffer, &*self.display);
    }

    fn poll_input(&mut self, now: Instant) {
        let Some(input) = self.input.as_mut() else {
            return;
        };

        let actions = &self.actions;
        let result = input.tick(now, &*self.display, &mut |action| {
            tracing::debug!(?action, "Button action");
            actions.enqueue(action);
        });

        match result {
            Ok(()) => self.faults = 0,
            Err(e) => {
                self.faults += 1;
                tracing::warn!(error = %e, faults = self.faults, "Button read failed");
                if self.faults >= self.max_faults {
                    tracing::error!(
                        faults = self.faults,
                        "INPUT LOOP DIED: buttons disabled, display keeps running"
                    );
                    self.input = None;
                }
            }
        }
    }
}
