/// Logical keys the game reacts to. Physical bindings live in `event`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Fire,
    Start,
}

/// Keyboard state polled once per frame.
pub trait Input {
    fn is_key_down(&self, key: Key) -> bool;

    /// Number of physical keys currently held, bound or not.
    fn key_count(&self) -> usize;
}

/// Scripted input for tests: a set of held logical keys plus any number of
/// unbound keys.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct Held {
    keys: Vec<Key>,
    unbound: usize,
}

#[cfg(test)]
impl Held {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn keys(keys: &[Key]) -> Self {
        Self {
            keys: keys.to_vec(),
            unbound: 0,
        }
    }

    pub fn unbound(count: usize) -> Self {
        Self {
            keys: Vec::new(),
            unbound: count,
        }
    }
}

#[cfg(test)]
impl Input for Held {
    fn is_key_down(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    fn key_count(&self) -> usize {
        self.keys.len() + self.unbound
    }
}
