extern crate std;

use core::cell::{Cell, RefCell};
use embassy_usb::driver::EndpointError;
use std::{rc::Rc, vec::Vec};

use crate::usb::ReportEndpoint;

/// An interrupt IN endpoint that records what is written to it.
#[derive(Clone, Default)]
pub struct MyEndpointIn {
    pub messages: Rc<RefCell<Vec<Vec<u8>>>>,
    /// Fail this many writes with [EndpointError::Disabled].
    pub disabled_writes: Rc<Cell<usize>>,
    pub ready_calls: Rc<Cell<usize>>,
}

impl MyEndpointIn {
    pub fn take(&self) -> Vec<Vec<u8>> {
        self.messages.take()
    }

    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReportEndpoint for MyEndpointIn {
    async fn write(&mut self, report: &[u8]) -> Result<(), EndpointError> {
        let disabled = self.disabled_writes.get();
        if disabled != 0 {
            self.disabled_writes.set(disabled - 1);
            return Err(EndpointError::Disabled);
        }
        self.messages.borrow_mut().push(Vec::from(report));
        Ok(())
    }

    async fn ready(&mut self) {
        self.ready_calls.set(self.ready_calls.get() + 1);
    }
}
