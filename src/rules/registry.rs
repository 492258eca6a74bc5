//! Ordered rule groups.

use super::MarkdownRule;

/// The four rule groups, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleGroup {
    /// Protects escaped characters and code before anything else runs
    Escaping,
    /// Built-in semantic rules, block constructs first
    Default,
    /// Caller-registered rules
    Custom,
    /// Restores protected content and styles code
    Unescaping,
}

impl RuleGroup {
    pub const ALL: [Self; 4] = [Self::Escaping, Self::Default, Self::Custom, Self::Unescaping];
}

/// Opaque identity of a registered custom rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleHandle(u64);

/// Owns the rules of a parser, grouped and ordered.
///
/// Only the custom group can change after construction.
#[derive(Debug)]
pub struct RuleRegistry {
    escaping: Vec<Box<dyn MarkdownRule>>,
    defaults: Vec<Box<dyn MarkdownRule>>,
    custom: Vec<(RuleHandle, Box<dyn MarkdownRule>)>,
    unescaping: Vec<Box<dyn MarkdownRule>>,
    next_handle: u64,
}

impl RuleRegistry {
    /// Create a registry with fixed escaping, default and unescaping groups
    /// and an empty custom group.
    pub fn new(
        escaping: Vec<Box<dyn MarkdownRule>>,
        defaults: Vec<Box<dyn MarkdownRule>>,
        unescaping: Vec<Box<dyn MarkdownRule>>,
    ) -> Self {
        Self {
            escaping,
            defaults,
            custom: Vec::new(),
            unescaping,
            next_handle: 0,
        }
    }

    /// Append a rule to the custom group.
    pub fn add_custom(&mut self, rule: Box<dyn MarkdownRule>) -> RuleHandle {
        let handle = RuleHandle(self.next_handle);
        self.next_handle += 1;
        self.custom.push((handle, rule));
        handle
    }

    /// Remove the custom rule registered under `handle`.
    ///
    /// Returns `None` (and changes nothing) when no such rule is registered.
    pub fn remove_custom(&mut self, handle: RuleHandle) -> Option<Box<dyn MarkdownRule>> {
        let index = self.custom.iter().position(|(h, _)| *h == handle)?;
        Some(self.custom.remove(index).1)
    }

    /// Handles of the custom rules, in insertion order.
    pub fn custom_handles(&self) -> impl Iterator<Item = RuleHandle> + '_ {
        self.custom.iter().map(|(handle, _)| *handle)
    }

    /// Rules of one group, in order.
    pub fn group(&self, group: RuleGroup) -> impl Iterator<Item = &(dyn MarkdownRule + 'static)> {
        let fixed: &[Box<dyn MarkdownRule>] = match group {
            RuleGroup::Escaping => &self.escaping,
            RuleGroup::Default => &self.defaults,
            RuleGroup::Custom => &[],
            RuleGroup::Unescaping => &self.unescaping,
        };
        let custom: &[(RuleHandle, Box<dyn MarkdownRule>)] = if group == RuleGroup::Custom {
            &self.custom
        } else {
            &[]
        };
        fixed
            .iter()
            .map(|rule| &**rule)
            .chain(custom.iter().map(|(_, rule)| &**rule))
    }

    /// Every rule in pipeline order: escaping, default, custom, unescaping.
    pub fn iter(&self) -> impl Iterator<Item = (RuleGroup, &(dyn MarkdownRule + 'static))> {
        RuleGroup::ALL
            .into_iter()
            .flat_map(move |group| self.group(group).map(move |rule| (group, rule)))
    }

    /// Total number of rules.
    pub fn len(&self) -> usize {
        self.escaping.len() + self.defaults.len() + self.custom.len() + self.unescaping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;
    use crate::text::StyledText;

    #[derive(Debug)]
    struct Named(&'static str);

    impl MarkdownRule for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn apply(&self, _text: &mut StyledText) -> Result<(), RuleError> {
            Ok(())
        }
    }

    fn registry() -> RuleRegistry {
        RuleRegistry::new(
            vec![Box::new(Named("esc"))],
            vec![Box::new(Named("header")), Box::new(Named("bold"))],
            vec![Box::new(Named("unesc"))],
        )
    }

    fn names(registry: &RuleRegistry) -> Vec<String> {
        registry.iter().map(|(_, rule)| rule.name().to_string()).collect()
    }

    #[test]
    fn test_groups_concatenate_in_fixed_order() {
        let mut registry = registry();
        registry.add_custom(Box::new(Named("mine")));
        assert_eq!(names(&registry), ["esc", "header", "bold", "mine", "unesc"]);
        let groups: Vec<_> = registry.iter().map(|(group, _)| group).collect();
        assert_eq!(
            groups,
            [
                RuleGroup::Escaping,
                RuleGroup::Default,
                RuleGroup::Default,
                RuleGroup::Custom,
                RuleGroup::Unescaping
            ]
        );
    }

    #[test]
    fn test_custom_rules_keep_insertion_order() {
        let mut registry = registry();
        registry.add_custom(Box::new(Named("first")));
        registry.add_custom(Box::new(Named("second")));
        let custom: Vec<_> = registry.group(RuleGroup::Custom).map(|r| r.name().to_string()).collect();
        assert_eq!(custom, ["first", "second"]);
    }

    #[test]
    fn test_remove_custom_by_handle() {
        let mut registry = registry();
        let first = registry.add_custom(Box::new(Named("same")));
        let second = registry.add_custom(Box::new(Named("same")));
        let removed = registry.remove_custom(second).unwrap();
        assert_eq!(removed.name(), "same");
        assert_eq!(registry.custom_handles().collect::<Vec<_>>(), [first]);
    }

    #[test]
    fn test_remove_absent_handle_is_noop() {
        let mut registry = registry();
        let handle = registry.add_custom(Box::new(Named("mine")));
        assert!(registry.remove_custom(handle).is_some());
        assert!(registry.remove_custom(handle).is_none());
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_handles_are_not_reused() {
        let mut registry = registry();
        let first = registry.add_custom(Box::new(Named("a")));
        registry.remove_custom(first);
        let second = registry.add_custom(Box::new(Named("b")));
        assert_ne!(first, second);
    }
}
