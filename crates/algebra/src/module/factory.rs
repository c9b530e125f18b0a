use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{ActionTable, ModuleComponent, ModuleError};
use crate::lie_algebra::{BasisKind, LieAlgebra};
use crate::root_system::RootSystem;
use crate::Weight;

/// The subalgebras that components are built from, relative to a subset `S` of the simple roots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subalgebra {
    /// The whole Lie algebra.
    G,
    /// Root vectors of negative roots whose support is not contained in `S`.
    N,
    /// Root vectors of positive roots whose support is not contained in `S`.
    U,
    /// The Borel subalgebra spanned by the negative root vectors and the Cartan subalgebra.
    B,
    /// The parabolic subalgebra: `b` together with the positive roots supported on `S`.
    P,
}

impl FromStr for Subalgebra {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "g" => Ok(Self::G),
            "n" => Ok(Self::N),
            "u" => Ok(Self::U),
            "b" => Ok(Self::B),
            "p" => Ok(Self::P),
            _ => Err(ModuleError::UnknownSubalgebra(s.to_owned())),
        }
    }
}

impl fmt::Display for Subalgebra {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::G => "g",
            Self::N => "n",
            Self::U => "u",
            Self::B => "b",
            Self::P => "p",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "ad")]
    Adjoint,
    #[serde(rename = "coad")]
    Coadjoint,
}

impl FromStr for ActionKind {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ad" => Ok(Self::Adjoint),
            "coad" => Ok(Self::Coadjoint),
            _ => Err(ModuleError::UnknownActionKind(s.to_owned())),
        }
    }
}

/// Builds [`ModuleComponent`]s out of the subalgebras of a Lie algebra.
pub struct ModuleComponentFactory<L: LieAlgebra> {
    algebra: Arc<L>,
}

impl<L: LieAlgebra> ModuleComponentFactory<L> {
    pub fn new(algebra: Arc<L>) -> Self {
        Self { algebra }
    }

    pub fn algebra(&self) -> &Arc<L> {
        &self.algebra
    }

    /// The weight of every basis element of the Lie algebra, indexed by basis element.
    pub fn weights(&self) -> Vec<Weight> {
        (0..self.algebra.dimension())
            .map(|i| self.algebra.weight(i).to_vec())
            .collect()
    }

    /// The basis of a subalgebra, as sorted indices into the basis of the Lie algebra. `subset`
    /// consists of 0-based indices of simple roots.
    pub fn subalgebra_basis(
        &self,
        subalgebra: Subalgebra,
        subset: &[usize],
    ) -> Result<Vec<usize>, ModuleError> {
        let rank = self.algebra.rank();
        if let Some(&index) = subset.iter().find(|&&i| i >= rank) {
            return Err(ModuleError::InvalidSubset { index, rank });
        }
        let in_levi =
            |i: usize| RootSystem::support(self.algebra.weight(i)).all(|k| subset.contains(&k));
        let algebra = &*self.algebra;
        Ok((0..algebra.dimension())
            .filter(|&i| match (subalgebra, algebra.kind(i)) {
                (Subalgebra::G, _) => true,
                (Subalgebra::N, BasisKind::Negative) => !in_levi(i),
                (Subalgebra::U, BasisKind::Positive) => !in_levi(i),
                (Subalgebra::B | Subalgebra::P, BasisKind::Negative | BasisKind::Cartan) => true,
                (Subalgebra::P, BasisKind::Positive) => in_levi(i),
                _ => false,
            })
            .collect())
    }

    /// The adjoint action of `acting` on `module`, i.e. `x_i · x_j = [x_i, x_j]`.
    pub fn adjoint_action_tensor(
        &self,
        acting: &[usize],
        module: &[usize],
    ) -> Result<ActionTable, ModuleError> {
        let mut action = ActionTable::default();
        for &i in acting {
            for &j in module {
                let bracket = self.algebra.bracket(i, j);
                if let Some(&(outside, _)) = bracket.iter().find(|(k, _)| !module.contains(k)) {
                    return Err(ModuleError::ClosureViolation {
                        generator: i,
                        element: j,
                        outside,
                    });
                }
                if !bracket.is_empty() {
                    action.insert((i, j), bracket.to_vec());
                }
            }
        }
        Ok(action)
    }

    /// The coadjoint action of `acting` on `module`. The module element `x_k` stands for the
    /// functional dual to `x_k*` where `*` is [`LieAlgebra::dual`], and `x · φ = -φ ∘ ad(x)`.
    /// Components landing outside the module are dropped, which is the action on the quotient.
    pub fn coadjoint_action_tensor(&self, acting: &[usize], module: &[usize]) -> ActionTable {
        let mut action = ActionTable::default();
        for &i in acting {
            for &k in module {
                for &(m, c) in self.algebra.bracket(i, self.algebra.dual(k)) {
                    let source = self.algebra.dual(m);
                    if module.contains(&source) {
                        action.entry((i, source)).or_default().push((k, -c));
                    }
                }
            }
        }
        for targets in action.values_mut() {
            targets.sort_unstable();
        }
        action
    }

    /// The component spanned by `subalgebra` with `acting` acting through `kind`.
    pub fn build_component(
        &self,
        subalgebra: Subalgebra,
        kind: ActionKind,
        subset: &[usize],
        acting: Subalgebra,
    ) -> Result<ModuleComponent, ModuleError> {
        let basis = self.subalgebra_basis(subalgebra, subset)?;
        let acting = self.subalgebra_basis(acting, subset)?;
        let action = match kind {
            ActionKind::Adjoint => self.adjoint_action_tensor(&acting, &basis)?,
            ActionKind::Coadjoint => self.coadjoint_action_tensor(&acting, &basis),
        };
        tracing::debug!(
            %subalgebra,
            ?kind,
            dimension = basis.len(),
            nonzero = action.len(),
            "built module component"
        );
        Ok(ModuleComponent::new(basis, acting, action))
    }
}
