/// Named character sets expanded into code points at collection time.
/// Sets are registered explicitly at startup; there is no dynamic discovery.

use crate::error::BuildError;

pub struct CharSet {
    pub name: &'static str,
    pub description: &'static str,
    chars: fn() -> Vec<char>,
}

impl CharSet {
    pub fn characters(&self) -> Vec<char> {
        (self.chars)()
    }
}

pub struct CharSetProvider {
    sets: Vec<CharSet>,
}

impl CharSetProvider {
    /// Empty registry; callers register their own sets.
    pub fn new() -> Self {
        Self { sets: Vec::new() }
    }

    /// Registry preloaded with the built-in sets.
    pub fn with_builtins() -> Self {
        let mut provider = Self::new();
        provider.register("ascii", "Ascii displayable: 32d .. 255d", || {
            (32u32..256).filter_map(char::from_u32).collect()
        });
        provider.register("numbers", "Numerical characters: '0'..'9'", || {
            ('0'..='9').collect()
        });
        provider.register("letters", "Standard alphabet: 'A'..'Z', 'a'..'z'", || {
            ('A'..='Z').chain('a'..='z').collect()
        });
        provider
    }

    pub fn register(
        &mut self,
        name: &'static str,
        description: &'static str,
        chars: fn() -> Vec<char>,
    ) {
        self.sets.push(CharSet {
            name,
            description,
            chars,
        });
    }

    /// Case-insensitive lookup by name.
    pub fn find(&self, name: &str) -> Option<&CharSet> {
        self.sets.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Expands a set to its code points; an unknown name is a
    /// configuration error.
    pub fn expand(&self, name: &str) -> Result<Vec<char>, BuildError> {
        self.find(name)
            .map(CharSet::characters)
            .ok_or_else(|| BuildError::UnknownCharSet(name.to_string()))
    }

    pub fn list(&self) -> &[CharSet] {
        &self.sets
    }
}

impl Default for CharSetProvider {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_set_range() {
        let sets = CharSetProvider::with_builtins();
        let chars = sets.expand("ascii").unwrap();
        assert_eq!(chars.len(), 224);
        assert_eq!(chars[0], ' ');
        assert_eq!(*chars.last().unwrap(), char::from_u32(255).unwrap());
    }

    #[test]
    fn test_letters_and_numbers() {
        let sets = CharSetProvider::with_builtins();
        assert_eq!(sets.expand("numbers").unwrap().len(), 10);
        assert_eq!(sets.expand("letters").unwrap().len(), 52);
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let sets = CharSetProvider::with_builtins();
        assert!(sets.find("Ascii").is_some());
        assert!(sets.find("LETTERS").is_some());
    }

    #[test]
    fn test_unknown_set_is_an_error() {
        let sets = CharSetProvider::with_builtins();
        assert!(matches!(
            sets.expand("klingon"),
            Err(BuildError::UnknownCharSet(_))
        ));
    }

    #[test]
    fn test_custom_registration() {
        let mut sets = CharSetProvider::new();
        sets.register("vowels", "aeiou", || "aeiou".chars().collect());
        assert_eq!(sets.expand("vowels").unwrap().len(), 5);
        assert_eq!(sets.list().len(), 1);
    }
}
