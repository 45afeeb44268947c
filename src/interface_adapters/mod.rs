// Interface adapters: wire protocol, network runner and the concrete ports.

pub mod input;
pub mod net;
pub mod persistence;
pub mod presentation;
pub mod protocol;
