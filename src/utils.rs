use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use algebra::module::{
    ActionKind, CompositeModule, ModuleComponentFactory, Slot, SlotKind, Subalgebra,
};
use algebra::{CartanType, ChevalleyAlgebra, RootSystem, Weight};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::BggCohomology;

const STATIC_MODULES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/bgg_modules");

/// How to build one atomic component of a module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentConfig {
    pub subalgebra: Subalgebra,
    pub action: ActionKind,
    /// The subalgebra acting on the component. This has to contain the negative root vectors
    /// for the BGG complex to make sense.
    ///
    /// Defaults to `b` rather than `n`. The differentials only use the action of `n`, so the two
    /// give the same cohomology, but with `b` the action tables also record the Cartan action and
    /// an `ad` component is checked to be stable under it.
    #[serde(default = "default_acting")]
    pub acting: Subalgebra,
}

fn default_acting() -> Subalgebra {
    Subalgebra::B
}

fn default_true() -> bool {
    true
}

/// A config object specifies the Lie algebra and a composite module over it.
///
/// In JSON, a module looks like
/// ```json
/// {
///     "root_system": "A2",
///     "subset": [],
///     "components": { "u": { "subalgebra": "u", "action": "coad" } },
///     "module": [[["u", 2, "wedge"]], [["u", 1, "tensor"], ["u", 1, "sym"]]]
/// }
/// ```
/// where every entry of `module` is a direct summand, listed as `[component, power, kind]`
/// triples.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub root_system: CartanType,
    /// 0-based indices of the simple roots defining the parabolic subalgebras.
    #[serde(default)]
    pub subset: Vec<usize>,
    pub components: BTreeMap<String, ComponentConfig>,
    pub module: Vec<Vec<(String, usize, SlotKind)>>,
    #[serde(default = "default_true")]
    pub check_collisions: bool,
}

impl Config {
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read module file {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("Failed to parse module file {}", path.display()))
    }

    /// The module descriptors with component names resolved to indices into
    /// [`Config::components`].
    pub fn descriptors(&self) -> anyhow::Result<Vec<Vec<Slot>>> {
        let names: Vec<&String> = self.components.keys().collect();
        self.module
            .iter()
            .map(|summand| {
                summand
                    .iter()
                    .map(|(name, power, kind)| {
                        let component = names
                            .iter()
                            .position(|n| *n == name)
                            .ok_or_else(|| anyhow!("Unknown component '{name}'"))?;
                        Ok(Slot::new(component, *power, *kind))
                    })
                    .collect()
            })
            .collect()
    }
}

impl TryFrom<Value> for Config {
    type Error = anyhow::Error;

    fn try_from(json: Value) -> Result<Self, Self::Error> {
        Ok(serde_json::from_value(json)?)
    }
}

/// A module name, optionally followed by `@` and a root system that replaces the one in the
/// file, e.g. `adjoint@A3`.
impl TryFrom<&str> for Config {
    type Error = anyhow::Error;

    fn try_from(spec: &str) -> Result<Self, Self::Error> {
        let mut args = spec.split('@');
        let name = args.next().unwrap_or_default();
        let mut config: Self = load_module_json(name)?.try_into()?;
        if let Some(root_system) = args.next() {
            config.root_system = root_system.parse()?;
        }
        Ok(config)
    }
}

/// Look for `name.json` in the current directory, `$CWD/bgg_modules` and the `bgg_modules`
/// directory of this crate, in that order.
pub fn load_module_json(name: &str) -> anyhow::Result<Value> {
    let current_dir = std::env::current_dir()?;
    let relative_dir = current_dir.join("bgg_modules");

    for path in [current_dir, relative_dir, PathBuf::from(STATIC_MODULES_PATH)] {
        let mut path = path.join(name);
        path.set_extension("json");
        if let Ok(s) = std::fs::read_to_string(&path) {
            return serde_json::from_str(&s)
                .with_context(|| format!("Failed to parse module file {}", path.display()));
        }
    }
    Err(anyhow!("Module file '{name}' not found on path"))
}

/// This constructs the BGG complex of the module described by `module_spec`.
///
/// # Arguments
///  - `module_spec`: A description of the module. This is any object that implements
///    [`TryInto<Config>`]. In practice, we can supply
///     - A [`Config`] object itself
///     - A [`serde_json::Value`] in the format described in [`Config`]
///     - A module name, searched for as in [`load_module_json`], optionally followed by
///       `@root_system`.
pub fn construct<T>(module_spec: T) -> anyhow::Result<BggCohomology<ChevalleyAlgebra>>
where
    T: TryInto<Config>,
    anyhow::Error: From<T::Error>,
{
    let config: Config = module_spec.try_into()?;
    let descriptors = config.descriptors()?;

    let root_system = Arc::new(RootSystem::new(config.root_system));
    let algebra = Arc::new(ChevalleyAlgebra::new(root_system)?);
    let factory = ModuleComponentFactory::new(Arc::clone(&algebra));
    let components = config
        .components
        .iter()
        .map(|(name, c)| {
            factory
                .build_component(c.subalgebra, c.action, &config.subset, c.acting)
                .with_context(|| format!("Failed to build component '{name}'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let module = CompositeModule::with_collision_check(
        factory.weights(),
        components,
        &descriptors,
        config.check_collisions,
    )?;
    Ok(BggCohomology::new(algebra, Arc::new(module))?)
}

/// Log to stderr, filtered by `RUST_LOG` and at level `info` by default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Fails if a subscriber is already installed, which is fine.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Render the cohomology in one degree as a sum of irreducible modules, e.g.
/// `H^0 = L(1, 1) + 2 L(1, 2)`.
pub fn format_cohomology(degree: usize, cohomology: &[(Weight, usize)]) -> String {
    let mut result = format!("H^{degree} = ");
    if cohomology.is_empty() {
        result.push('0');
        return result;
    }
    for (i, (weight, multiplicity)) in cohomology.iter().enumerate() {
        if i > 0 {
            result.push_str(" + ");
        }
        if *multiplicity != 1 {
            let _ = write!(result, "{multiplicity} ");
        }
        let weight = weight.iter().map(i32::to_string).collect::<Vec<_>>();
        let _ = write!(result, "L({})", weight.join(", "));
    }
    result
}

#[cfg(test)]
mod test {
    use expect_test::expect;
    use serde_json::json;

    use super::*;

    fn config() -> Value {
        json!({
            "root_system": "A2",
            "components": {
                "g": { "subalgebra": "g", "action": "ad", "acting": "g" },
                "u": { "subalgebra": "u", "action": "coad" }
            },
            "module": [[["g", 1, "tensor"]], [["u", 2, "wedge"]]]
        })
    }

    #[test]
    fn test_parse() {
        let config = Config::try_from(config()).unwrap();
        assert_eq!(config.root_system, CartanType::A(2));
        assert!(config.subset.is_empty());
        assert!(config.check_collisions);
        assert_eq!(config.components["u"].acting, Subalgebra::B);
        assert_eq!(
            config.descriptors().unwrap(),
            vec![
                vec![Slot::new(0, 1, SlotKind::Tensor)],
                vec![Slot::new(1, 2, SlotKind::Exterior)]
            ]
        );
    }

    #[test]
    fn test_unknown_fields() {
        let mut json = config();
        json["modules"] = json!([]);
        assert!(Config::try_from(json).is_err());

        let mut json = config();
        json["module"] = json!([[["g", 1, "alt"]]]);
        assert!(Config::try_from(json).is_err());

        let mut json = config();
        json["components"]["g"]["action"] = json!("co");
        assert!(Config::try_from(json).is_err());
    }

    #[test]
    fn test_unknown_component() {
        let mut json = config();
        json["module"] = json!([[["h", 1, "tensor"]]]);
        let err = construct(json).err().unwrap();
        expect!["Unknown component 'h'"].assert_eq(&err.to_string());
    }

    #[test]
    fn test_construct() {
        let cohomology = construct(config()).unwrap();
        assert_eq!(cohomology.module().total_dimension(), 8 + 3);
        assert_eq!(cohomology.graph().vertex_count(), 6);
    }

    #[test]
    fn test_acting_default() {
        let cohomology = |acting: Option<&str>| {
            let mut json = config();
            match acting {
                Some(acting) => json["components"]["u"]["acting"] = json!(acting),
                None => assert_eq!(json["components"]["u"].get("acting"), None),
            }
            construct(json).unwrap().cohomology_all().unwrap()
        };
        let default = cohomology(None);
        assert_eq!(default, cohomology(Some("b")));
        assert_eq!(default, cohomology(Some("n")));
    }

    #[test]
    fn test_format() {
        expect!["H^2 = 0"].assert_eq(&format_cohomology(2, &[]));
        expect!["H^0 = L(0, 0) + 2 L(1, 1)"]
            .assert_eq(&format_cohomology(0, &[(vec![0, 0], 1), (vec![1, 1], 2)]));
    }
}
