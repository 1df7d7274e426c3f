use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Named, type-erased values attached to a pipeline.
#[derive(Default)]
pub struct Variables {
    values: HashMap<String, Box<dyn Any>>,
}

impl Variables {
    /// Stores `value` under `name`, replacing any earlier value.
    pub fn set<T: Any>(&mut self, name: impl Into<String>, value: T) {
        self.values.insert(name.into(), Box::new(value));
    }

    /// The value stored under `name`, if there is one of type `T`.
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.values.get(name)?.downcast_ref()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Variables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_set().entries(names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn variables() -> Variables {
        let mut variables = Variables::default();
        variables.set("limit", 10_usize);
        variables.set("name", String::from("marko"));
        variables
    }

    #[rstest]
    fn typed_round_trip(variables: Variables) {
        assert_eq!(variables.get::<usize>("limit"), Some(&10));
        assert_eq!(variables.get::<String>("name").map(String::as_str), Some("marko"));
        assert_eq!(variables.len(), 2);
    }

    #[rstest]
    #[case("missing")]
    #[case("")]
    fn unset_name_reads_empty(variables: Variables, #[case] name: &str) {
        assert_eq!(variables.get::<usize>(name), None);
        assert!(!variables.contains(name));
    }

    #[rstest]
    fn type_mismatch_reads_empty(variables: Variables) {
        assert_eq!(variables.get::<u32>("limit"), None);
        assert!(variables.contains("limit"));
    }

    #[rstest]
    fn last_write_wins(mut variables: Variables) {
        variables.set("limit", 3_usize);
        variables.set("limit", "three");
        assert_eq!(variables.get::<usize>("limit"), None);
        assert_eq!(variables.get::<&str>("limit"), Some(&"three"));
        assert_eq!(variables.len(), 2);
    }
}
