//! Kind key -> constructor table, built once per process and read-only afterwards.

use std::sync::OnceLock;

use super::{
    AngleBisector, BSpline, BoolOp, CircleWithRadius, CopyRotate, DynaStroke, EffectKind,
    EffectOp, FilletChamfer, Gears, Interpolate, Knot, Lattice, MeasureLine, Offset, PerpBisector,
    PowerStroke, RoughHatches, VonKoch,
};
use crate::foundation::error::{LpeError, LpeResult};

pub type Constructor = fn() -> EffectOp;

#[derive(Clone, Copy, Debug)]
pub struct RegistryEntry {
    pub kind: EffectKind,
    pub construct: Constructor,
}

#[derive(Debug)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

macro_rules! builtin_entries {
    ($($kind:ident => $ty:ident),+ $(,)?) => {
        vec![$(RegistryEntry {
            kind: EffectKind::$kind,
            construct: || EffectOp::$kind($ty::new()),
        }),+]
    };
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| Registry {
        entries: builtin_entries![
            DynaStroke => DynaStroke,
            PowerStroke => PowerStroke,
            Gears => Gears,
            CopyRotate => CopyRotate,
            Interpolate => Interpolate,
            BSpline => BSpline,
            FilletChamfer => FilletChamfer,
            Lattice => Lattice,
            VonKoch => VonKoch,
            Offset => Offset,
            PerpBisector => PerpBisector,
            AngleBisector => AngleBisector,
            CircleWithRadius => CircleWithRadius,
            BoolOp => BoolOp,
            Knot => Knot,
            RoughHatches => RoughHatches,
            MeasureLine => MeasureLine,
        ],
    })
}

impl Registry {
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn kinds(&self) -> impl Iterator<Item = EffectKind> + '_ {
        self.entries.iter().map(|e| e.kind)
    }

    pub fn construct(&self, kind: EffectKind) -> LpeResult<EffectOp> {
        self.entries
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| (e.construct)())
            .ok_or_else(|| LpeError::unknown_kind(kind.key()))
    }

    /// Constructs by persisted key.
    pub fn construct_key(&self, key: &str) -> LpeResult<EffectOp> {
        let kind = EffectKind::from_key(key).ok_or_else(|| LpeError::unknown_kind(key))?;
        self.construct(kind)
    }
}
