//! The action buffer: a FIFO queue of issued actions with block markers.
//!
//! Consumed actions stay in the buffer (the position index advances past
//! them) so a cursor can be caught up by id after the fact, e.g. when a
//! device acknowledgment for id `n` implies every unacknowledged action
//! up to `n`.

use crate::action::Action;

#[derive(Debug, Default)]
pub struct ActionBuffer {
    actions: Vec<Action>,
    /// Index of the next pending action.
    position: usize,
    /// End-exclusive indices partitioning issued actions into blocks.
    block_marks: Vec<usize>,
}

impl ActionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Consume and return the oldest pending action.
    pub fn pop_next(&mut self) -> Option<Action> {
        let action = self.actions.get(self.position)?.clone();
        self.position += 1;
        Some(action)
    }

    pub fn peek_next(&self) -> Option<&Action> {
        self.actions.get(self.position)
    }

    pub fn pending_count(&self) -> usize {
        self.actions.len() - self.position
    }

    pub fn are_pending(&self) -> bool {
        self.pending_count() > 0
    }

    /// All pending actions in issue order.
    pub fn pending(&self) -> &[Action] {
        &self.actions[self.position..]
    }

    /// Close the current block at the end of the issued actions.
    pub fn mark_block(&mut self) {
        let end = self.actions.len();
        if self.block_marks.last() != Some(&end) {
            self.block_marks.push(end);
        }
    }

    /// Pending actions up to the first block boundary past the current
    /// position; everything pending when no boundary applies.
    pub fn pending_block(&self) -> &[Action] {
        let end = self
            .block_marks
            .iter()
            .copied()
            .find(|&mark| mark > self.position)
            .unwrap_or(self.actions.len());
        &self.actions[self.position..end]
    }

    /// All issued actions with ids up to and including `id`, pending or
    /// not.
    pub fn issued_up_to_id(&self, id: u64) -> &[Action] {
        let end = self.actions.partition_point(|a| a.id <= id);
        &self.actions[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;

    fn wait(ms: u64) -> Action {
        Action::new(ActionKind::Wait { millis: ms })
    }

    #[test]
    fn fifo_order_matches_id_order() {
        let mut buffer = ActionBuffer::new();
        let ids: Vec<u64> = (0..3)
            .map(|i| {
                let action = wait(i);
                let id = action.id;
                buffer.append(action);
                id
            })
            .collect();

        for expected in ids {
            assert_eq!(buffer.pop_next().map(|a| a.id), Some(expected));
        }
        assert!(buffer.pop_next().is_none());
    }

    #[test]
    fn blocks_partition_pending_actions() {
        let mut buffer = ActionBuffer::new();
        buffer.append(wait(1));
        buffer.append(wait(2));
        buffer.mark_block();
        buffer.append(wait(3));

        assert_eq!(buffer.pending_block().len(), 2);
        assert_eq!(buffer.pending().len(), 3);

        buffer.pop_next();
        buffer.pop_next();
        assert_eq!(buffer.pending_block().len(), 1);
    }

    #[test]
    fn issued_up_to_id_includes_consumed() {
        let mut buffer = ActionBuffer::new();
        buffer.append(wait(1));
        buffer.append(wait(2));
        buffer.append(wait(3));
        let second_id = buffer.pending()[1].id;

        buffer.pop_next();
        assert_eq!(buffer.issued_up_to_id(second_id).len(), 2);
    }

    #[test]
    fn double_mark_is_one_boundary() {
        let mut buffer = ActionBuffer::new();
        buffer.append(wait(1));
        buffer.mark_block();
        buffer.mark_block();
        assert_eq!(buffer.pending_block().len(), 1);
    }
}
