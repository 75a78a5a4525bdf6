//! Parameter Streaming
//!
//! Drives the parameter cursor so PARAM_VALUE walks the parameter store one entry
//! per dispatch cycle.
//!
//! # Requests
//!
//! - **List** (PARAM_REQUEST_LIST): every parameter in index order, each once
//! - **Read** (PARAM_REQUEST_READ): a single parameter by index; served before
//!   the next list entry
//!
//! # Cadence
//!
//! `poll()` only advances when the previous PARAM_VALUE request has been consumed
//! by the dispatcher, so at most one parameter goes out per cycle and none is
//! skipped even if the dispatcher falls behind the scheduler.

use crate::communication::mavlink::gate::MessageKind;
use crate::communication::mavlink::state::TelemetryState;
use crate::core::parameters::ParamStoreError;

/// Parameter cursor driver
#[derive(Debug, Default)]
pub struct ParamStreamer {
    /// Next index of an active list request
    next: u16,
    /// Parameter count of an active list request (0 = no list active)
    count: u16,
    /// Pending single read
    single: Option<u16>,
}

impl ParamStreamer {
    /// Create an idle streamer
    pub const fn new() -> Self {
        Self {
            next: 0,
            count: 0,
            single: None,
        }
    }

    /// Begin streaming all `count` parameters from index 0
    ///
    /// Restarts from 0 if a list was already in progress.
    pub fn start_list(&mut self, count: u16) {
        crate::log_info!("Parameter list requested ({} params)", count);
        self.next = 0;
        self.count = count;
    }

    /// Schedule a single parameter
    pub fn request_read(&mut self, index: u16, count: u16) -> Result<(), ParamStoreError> {
        if index >= count {
            return Err(ParamStoreError::IndexOutOfRange { index, count });
        }
        self.single = Some(index);
        Ok(())
    }

    /// Whether any parameter is still waiting to be scheduled
    pub fn is_active(&self) -> bool {
        self.single.is_some() || self.next < self.count
    }

    /// Parameters of the active list not yet scheduled
    pub fn remaining(&self) -> u16 {
        self.count.saturating_sub(self.next)
    }

    /// Abandon any list or pending read
    pub fn cancel(&mut self) {
        *self = Self::new();
    }

    /// Schedule the next parameter if the previous one has gone out
    ///
    /// Call once per scheduler tick, before the dispatch cycle.
    ///
    /// # Returns
    ///
    /// Index placed on the cursor, or None if nothing was scheduled.
    pub fn poll(&mut self, state: &TelemetryState) -> Option<u16> {
        if state.gate().is_requested(MessageKind::ParamValue) {
            return None; // Previous parameter not sent yet
        }

        let index = match self.single.take() {
            Some(index) => index,
            None if self.next < self.count => {
                let index = self.next;
                self.next += 1;
                if self.next == self.count {
                    crate::log_info!("Parameter list complete ({} params)", self.count);
                }
                index
            }
            None => return None,
        };

        state.set_param_cursor(index);
        state.request_send(MessageKind::ParamValue);
        Some(index)
    }
}
