//! Per-frame "scene post update" subscription list

use super::node::NodeId;

/// Nodes whose animated sprite wants a step after each scene update.
///
/// Subscription order is kept so that delivery is deterministic.
#[derive(Clone, Debug, Default)]
pub struct FrameStepBus {
    subscribers: Vec<NodeId>,
}

impl FrameStepBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a node; subscribing twice has no effect
    pub fn subscribe(&mut self, node: NodeId) {
        if !self.subscribers.contains(&node) {
            log::trace!("Frame step subscribe: node {}", node.to_bits());
            self.subscribers.push(node);
        }
    }

    /// Unsubscribe a node if present
    pub fn unsubscribe(&mut self, node: NodeId) {
        if let Some(pos) = self.subscribers.iter().position(|n| *n == node) {
            log::trace!("Frame step unsubscribe: node {}", node.to_bits());
            self.subscribers.remove(pos);
        }
    }

    pub fn is_subscribed(&self, node: NodeId) -> bool {
        self.subscribers.contains(&node)
    }

    /// Current subscribers in subscription order
    pub fn subscribers(&self) -> &[NodeId] {
        &self.subscribers
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(n: usize) -> Vec<NodeId> {
        let mut world = hecs::World::new();
        (0..n).map(|_| NodeId(world.spawn(()))).collect()
    }

    #[test]
    fn test_subscribe_once() {
        let ids = nodes(2);
        let mut bus = FrameStepBus::new();
        bus.subscribe(ids[0]);
        bus.subscribe(ids[0]);
        bus.subscribe(ids[1]);
        assert_eq!(bus.subscribers(), &[ids[0], ids[1]]);
    }

    #[test]
    fn test_unsubscribe() {
        let ids = nodes(2);
        let mut bus = FrameStepBus::new();
        bus.subscribe(ids[0]);
        bus.unsubscribe(ids[1]);
        assert_eq!(bus.len(), 1);
        bus.unsubscribe(ids[0]);
        assert!(bus.is_empty());
        assert!(!bus.is_subscribed(ids[0]));
    }
}
