//! Input intents
//!
//! Commands arrive from event handlers at any time but are only applied at
//! the start of the next tick. The queue is bounded; overflow drops the
//! newest command.

use crate::consts::INPUT_QUEUE_CAPACITY;

/// Logical player command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputCommand {
    Jump,
    StartBoost,
    StopBoost,
}

/// Commands applied during a single tick, in arrival order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub commands: Vec<InputCommand>,
}

impl TickInput {
    pub fn wants_jump(&self) -> bool {
        self.commands.contains(&InputCommand::Jump)
    }
}

/// Bounded FIFO of pending commands
#[derive(Debug, Clone)]
pub struct InputQueue {
    pending: Vec<InputCommand>,
    capacity: usize,
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::with_capacity(INPUT_QUEUE_CAPACITY)
    }
}

impl InputQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Queue a command. Returns false if it was dropped.
    ///
    /// Repeated boost toggles collapse into one (held keys auto-repeat);
    /// jumps never collapse because a double tap is a double jump.
    pub fn push(&mut self, command: InputCommand) -> bool {
        if command != InputCommand::Jump && self.pending.last() == Some(&command) {
            return true;
        }
        if self.pending.len() >= self.capacity {
            log::debug!("Input queue full, dropping {:?}", command);
            return false;
        }
        self.pending.push(command);
        true
    }

    /// Hand all pending commands to the next tick
    pub fn drain(&mut self) -> TickInput {
        TickInput {
            commands: std::mem::take(&mut self.pending),
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
