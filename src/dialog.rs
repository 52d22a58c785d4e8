//! Blocking dialog queue.
//!
//! Lines are shown one at a time; a click or tap pops the front. The turn
//! scheduler does not advance while anything is queued.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub speaker: String,
    pub text: String,
    /// Drawn as a thought bubble instead of speech
    pub thought: bool,
}

impl Dialog {
    pub fn say(speaker: &str, text: &str) -> Self {
        Self {
            speaker: speaker.to_string(),
            text: text.to_string(),
            thought: false,
        }
    }

    pub fn think(speaker: &str, text: &str) -> Self {
        Self {
            thought: true,
            ..Self::say(speaker, text)
        }
    }
}

#[derive(Debug, Default)]
pub struct DialogQueue {
    lines: VecDeque<Dialog>,
}

impl DialogQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, dialog: Dialog) {
        self.lines.push_back(dialog);
    }

    /// Queue several lines from one speaker
    pub fn say_all(&mut self, speaker: &str, lines: &[&str]) {
        for line in lines {
            self.push(Dialog::say(speaker, line));
        }
    }

    /// Dismiss the line on screen
    pub fn pop(&mut self) -> Option<Dialog> {
        self.lines.pop_front()
    }

    pub fn front(&self) -> Option<&Dialog> {
        self.lines.front()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_pop_in_order() {
        let mut queue = DialogQueue::new();
        queue.say_all("Minnie", &["one", "two"]);
        queue.push(Dialog::think("Marshall", "three"));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop().unwrap().text, "one");
        assert_eq!(queue.front().unwrap().text, "two");
        queue.pop();
        let last = queue.pop().unwrap();
        assert!(last.thought);
        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }
}
