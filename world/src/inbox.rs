//! Remote calls received between ticks.

use std::collections::BTreeMap;

use skirmish_core::{CharacterId, Intent};

/// Intent waiting for the start of the next tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct QueuedIntent {
    pub(crate) character: CharacterId,
    pub(crate) intent: Intent,
}

/// Arrival-ordered queue of intents for the upcoming tick.
#[derive(Debug, Default)]
pub(crate) struct IntentInbox {
    pending: Vec<QueuedIntent>,
}

impl IntentInbox {
    pub(crate) fn queue(&mut self, character: CharacterId, intent: Intent) {
        self.pending.push(QueuedIntent { character, intent });
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    /// Empties the queue for application.
    ///
    /// Movement describes the desired motion for the tick, so only the last
    /// movement intent per character survives; attack and dash calls are all
    /// kept. Arrival order is preserved.
    pub(crate) fn drain(&mut self) -> Vec<QueuedIntent> {
        let mut last_movement: BTreeMap<CharacterId, usize> = BTreeMap::new();
        for (index, queued) in self.pending.iter().enumerate() {
            if matches!(queued.intent, Intent::Movement { .. }) {
                let _ = last_movement.insert(queued.character, index);
            }
        }

        self.pending
            .drain(..)
            .enumerate()
            .filter(|(index, queued)| match queued.intent {
                Intent::Movement { .. } => last_movement.get(&queued.character) == Some(index),
                Intent::Attack | Intent::Dash { .. } => true,
            })
            .map(|(_, queued)| queued)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn movement(x: f32) -> Intent {
        Intent::Movement {
            direction: Vec3::new(x, 0.0, 0.0),
            running: false,
        }
    }

    #[test]
    fn keeps_last_movement_per_character() {
        let mut inbox = IntentInbox::default();
        let first = CharacterId::new(1);
        let second = CharacterId::new(2);
        inbox.queue(first, movement(1.0));
        inbox.queue(second, movement(0.5));
        inbox.queue(first, Intent::Attack);
        inbox.queue(first, movement(-1.0));

        let drained = inbox.drain();
        assert_eq!(
            drained,
            vec![
                QueuedIntent {
                    character: second,
                    intent: movement(0.5),
                },
                QueuedIntent {
                    character: first,
                    intent: Intent::Attack,
                },
                QueuedIntent {
                    character: first,
                    intent: movement(-1.0),
                },
            ]
        );
        assert_eq!(inbox.len(), 0);
    }

    #[test]
    fn keeps_every_action() {
        let mut inbox = IntentInbox::default();
        let character = CharacterId::new(4);
        inbox.queue(character, Intent::Attack);
        inbox.queue(character, Intent::Attack);
        inbox.queue(
            character,
            Intent::Dash {
                direction: Vec3::Z,
            },
        );
        assert_eq!(inbox.drain().len(), 3);
    }
}
