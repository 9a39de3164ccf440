// src/exec/detach.rs

//! Start a child so that it outlives the current process.
//!
//! On Unix the child is moved into its own process group, which keeps it out
//! of the parent's job control and signal delivery. On Windows it gets a new
//! process group and no console.
//!
//! Implemented on `std::process::Command`; convert into a Tokio command with
//! `tokio::process::Command::from` afterwards.

use std::process::Command;

pub trait DetachExt {
    /// Configure the command to run detached from the current process.
    fn detach(&mut self) -> &mut Self;
}

impl DetachExt for Command {
    #[cfg(unix)]
    fn detach(&mut self) -> &mut Self {
        use std::os::unix::process::CommandExt;
        self.process_group(0)
    }

    #[cfg(windows)]
    fn detach(&mut self) -> &mut Self {
        use std::os::windows::process::CommandExt;
        const DETACHED_PROCESS: u32 = 0x0000_0008;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        self.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP)
    }

    #[cfg(not(any(unix, windows)))]
    fn detach(&mut self) -> &mut Self {
        self
    }
}
