use std::collections::{HashMap, HashSet};

use crate::domain::{EntityFields, Presentation, ProxyHandle, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PresentationCall {
    Create { key: String, handle: ProxyHandle },
    Destroy(ProxyHandle),
    DeathEffect(Vec3),
}

// Presentation fake that records lifecycle calls and the last drawn position per proxy.
#[derive(Default)]
pub(crate) struct RecordingPresentation {
    pub calls: Vec<PresentationCall>,
    next_handle: u64,
    live: HashSet<ProxyHandle>,
    positions: HashMap<ProxyHandle, Vec3>,
}

impl RecordingPresentation {
    pub(crate) fn live_proxies(&self) -> usize {
        self.live.len()
    }

    pub(crate) fn last_position(&self, handle: ProxyHandle) -> Option<Vec3> {
        self.positions.get(&handle).copied()
    }
}

impl Presentation for RecordingPresentation {
    fn create_proxy(&mut self, key: &str, _fields: &EntityFields) -> ProxyHandle {
        self.next_handle += 1;
        let handle = ProxyHandle(self.next_handle);
        self.live.insert(handle);
        self.calls.push(PresentationCall::Create {
            key: key.to_string(),
            handle,
        });
        handle
    }

    fn destroy_proxy(&mut self, handle: ProxyHandle) {
        assert!(self.live.remove(&handle), "proxy {handle:?} destroyed twice");
        self.positions.remove(&handle);
        self.calls.push(PresentationCall::Destroy(handle));
    }

    fn set_proxy_position(&mut self, handle: ProxyHandle, position: Vec3) {
        assert!(self.live.contains(&handle), "proxy {handle:?} moved after destroy");
        self.positions.insert(handle, position);
    }

    fn play_death_effect(&mut self, position: Vec3) {
        self.calls.push(PresentationCall::DeathEffect(position));
    }
}
