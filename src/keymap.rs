//! Computer keyboard to semitone offset table.
//!
//! The default layout uses two letter rows as a small piano around C4:
//!
//! ```text
//!  top row   Q  W  E  R  T  Y  U  I  O  P
//!             0  1  2  3  4  5  6  7  8  9
//!  home row  A  S  D  F  G  H  J  K  L
//!            -9 -8 -7 -6 -5 -4 -3 -2 -1
//! ```

const TOP_ROW: &str = "qwertyuiop";
const HOME_ROW: &str = "asdfghjkl";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    bindings: Vec<(char, i32)>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let top = TOP_ROW.chars().zip(0..);
        let home = HOME_ROW.chars().zip(-9..);
        Self {
            bindings: top.chain(home).collect(),
        }
    }
}

impl KeyMap {
    /// Offset bound to `key`, ignoring case.
    pub fn offset(&self, key: char) -> Option<i32> {
        let key = key.to_ascii_lowercase();
        self.bindings
            .iter()
            .find(|(k, _)| *k == key)
            .map(|&(_, offset)| offset)
    }

    pub fn contains(&self, key: char) -> bool {
        self.offset(key).is_some()
    }

    /// Bind `key` to `offset`, replacing any existing binding.
    pub fn bind(&mut self, key: char, offset: i32) -> &mut Self {
        let key = key.to_ascii_lowercase();
        match self.bindings.iter_mut().find(|(k, _)| *k == key) {
            Some(binding) => binding.1 = offset,
            None => self.bindings.push((key, offset)),
        }
        self
    }

    pub fn unbind(&mut self, key: char) -> Option<i32> {
        let key = key.to_ascii_lowercase();
        let idx = self.bindings.iter().position(|(k, _)| *k == key)?;
        Some(self.bindings.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, i32)> + '_ {
        self.bindings.iter().copied()
    }
}
