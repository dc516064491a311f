//! Two-tier operation dispatch.
//!
//! Every lane-wise operation first asks an [`IntrinsicResolver`] for a
//! hardware kernel matching its [`OpKey`]. When the resolver has none, the
//! generic per-lane kernel from [`crate::kernels`] runs instead. Both tiers
//! produce bit-identical results.
//!
//! Resolution results, hits and misses alike, are cached per key. The cache is
//! process-wide per lane type and is cleared whenever a new resolver is
//! installed.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, info};

use crate::kernels::{BinaryLaneFn, CompareLaneFn, TernaryLaneFn, UnaryLaneFn};
use crate::lane::{LaneElement, LaneType};
use crate::operators::OpCode;
use crate::shape::Shape;

pub type UnaryKernel<E> = fn(&[E], &mut [E]);
pub type BinaryKernel<E> = fn(&[E], &[E], &mut [E]);
pub type TernaryKernel<E> = fn(&[E], &[E], &[E], &mut [E]);
pub type ReductionKernel<E> = fn(&[E]) -> E;
pub type CompareKernel<E> = fn(&[E], &[E], &mut [bool]);

/// The concrete vector kind an operation runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VectorClass {
    pub lane: LaneType,
    pub shape: Shape,
}

/// Lookup key of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpKey {
    pub opcode: OpCode,
    pub vector: VectorClass,
    /// Whether the operation is applied under a mask.
    pub masked: bool,
    pub lane: LaneType,
    pub length: usize,
}

impl OpKey {
    pub fn new(opcode: OpCode, shape: Shape, lane: LaneType, length: usize) -> Self {
        Self {
            opcode,
            vector: VectorClass { lane, shape },
            masked: false,
            lane,
            length,
        }
    }

    pub fn with_mask(mut self) -> Self {
        self.masked = true;
        self
    }

    /// Total bits covered by the operation.
    pub fn vector_bits(&self) -> usize {
        self.length * self.lane.bit_size()
    }
}

impl fmt::Display for OpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "op {} on {}x{} {}{}",
            self.opcode.0,
            self.lane,
            self.length,
            self.vector.shape,
            if self.masked { " masked" } else { "" }
        )
    }
}

/// A hardware kernel operating on whole lane arrays.
pub enum Kernel<E> {
    Unary(UnaryKernel<E>),
    Binary(BinaryKernel<E>),
    Ternary(TernaryKernel<E>),
    Reduction(ReductionKernel<E>),
    Compare(CompareKernel<E>),
}

impl<E> Clone for Kernel<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Kernel<E> {}

impl<E> fmt::Debug for Kernel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arity = match self {
            Kernel::Unary(_) => "Unary",
            Kernel::Binary(_) => "Binary",
            Kernel::Ternary(_) => "Ternary",
            Kernel::Reduction(_) => "Reduction",
            Kernel::Compare(_) => "Compare",
        };
        write!(f, "Kernel::{arity}")
    }
}

/// Maps an operation key to a hardware kernel.
///
/// Returning `None` selects the generic kernel. A resolver must only return
/// kernels whose results are bit-identical to the generic ones.
pub trait IntrinsicResolver<E: LaneElement>: Send + Sync {
    fn resolve(&self, key: &OpKey) -> Option<Kernel<E>>;

    fn name(&self) -> &str;
}

/// Resolves to the kernels compiled for the running CPU.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeResolver;

impl<E: LaneElement> IntrinsicResolver<E> for NativeResolver {
    fn resolve(&self, key: &OpKey) -> Option<Kernel<E>> {
        E::native_kernel(key)
    }

    fn name(&self) -> &str {
        "native"
    }
}

/// Never resolves, forcing every operation onto the generic kernels.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericOnly;

impl<E: LaneElement> IntrinsicResolver<E> for GenericOnly {
    fn resolve(&self, _key: &OpKey) -> Option<Kernel<E>> {
        None
    }

    fn name(&self) -> &str {
        "generic"
    }
}

struct DispatchState<E: LaneElement> {
    resolver: Arc<dyn IntrinsicResolver<E>>,
    cache: HashMap<OpKey, Option<Kernel<E>>>,
}

/// Dispatch engine for one lane type.
pub struct Dispatcher<E: LaneElement> {
    state: RwLock<DispatchState<E>>,
}

impl<E: LaneElement> Dispatcher<E> {
    pub fn new(resolver: Arc<dyn IntrinsicResolver<E>>) -> Self {
        Self {
            state: RwLock::new(DispatchState {
                resolver,
                cache: HashMap::new(),
            }),
        }
    }

    /// Native kernels, unless the `force-generic` feature is enabled.
    pub fn with_default_resolver() -> Self {
        if cfg!(feature = "force-generic") {
            Self::new(Arc::new(GenericOnly))
        } else {
            Self::new(Arc::new(NativeResolver))
        }
    }

    /// Hardware kernel for `key`, resolving and caching on first use.
    pub fn lookup(&self, key: &OpKey) -> Option<Kernel<E>> {
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = state.cache.get(key) {
                return *entry;
            }
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = state.cache.get(key) {
            return *entry;
        }
        let resolved = state.resolver.resolve(key);
        debug!(
            "{} resolver mapped {key} to {}",
            state.resolver.name(),
            if resolved.is_some() { "a hardware kernel" } else { "the generic kernel" }
        );
        state.cache.insert(*key, resolved);
        resolved
    }

    /// Replaces the resolver and discards every cached resolution.
    pub fn install_resolver(&self, resolver: Arc<dyn IntrinsicResolver<E>>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        info!(
            "installing {} resolver for {} lanes (was {}, {} cached entries dropped)",
            resolver.name(),
            E::LANE_TYPE,
            state.resolver.name(),
            state.cache.len()
        );
        state.resolver = resolver;
        state.cache.clear();
    }

    pub fn resolver_name(&self) -> String {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.resolver.name().to_string()
    }

    pub fn cached_entries(&self) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.cache.len()
    }

    pub(crate) fn run_unary(&self, key: &OpKey, generic: UnaryLaneFn<E>, a: &[E]) -> Box<[E]> {
        let mut out = vec![E::ZERO; a.len()];
        match self.lookup(key) {
            Some(Kernel::Unary(kernel)) => kernel(a, &mut out),
            _ => {
                for (i, (o, &x)) in out.iter_mut().zip(a).enumerate() {
                    *o = generic(i, x);
                }
            }
        }
        out.into_boxed_slice()
    }

    pub(crate) fn run_binary(
        &self,
        key: &OpKey,
        generic: BinaryLaneFn<E>,
        a: &[E],
        b: &[E],
    ) -> Box<[E]> {
        let mut out = vec![E::ZERO; a.len()];
        match self.lookup(key) {
            Some(Kernel::Binary(kernel)) => kernel(a, b, &mut out),
            _ => {
                for (i, ((o, &x), &y)) in out.iter_mut().zip(a).zip(b).enumerate() {
                    *o = generic(i, x, y);
                }
            }
        }
        out.into_boxed_slice()
    }

    pub(crate) fn run_ternary(
        &self,
        key: &OpKey,
        generic: TernaryLaneFn<E>,
        a: &[E],
        b: &[E],
        c: &[E],
    ) -> Box<[E]> {
        let mut out = vec![E::ZERO; a.len()];
        match self.lookup(key) {
            Some(Kernel::Ternary(kernel)) => kernel(a, b, c, &mut out),
            _ => {
                for (i, o) in out.iter_mut().enumerate() {
                    *o = generic(i, a[i], b[i], c[i]);
                }
            }
        }
        out.into_boxed_slice()
    }

    /// Folds `lanes` in ascending lane order starting from `identity`.
    pub(crate) fn run_reduction(
        &self,
        key: &OpKey,
        identity: E,
        step: BinaryLaneFn<E>,
        lanes: &[E],
    ) -> E {
        match self.lookup(key) {
            Some(Kernel::Reduction(kernel)) => kernel(lanes),
            _ => lanes
                .iter()
                .enumerate()
                .fold(identity, |acc, (i, &x)| step(i, acc, x)),
        }
    }

    pub(crate) fn run_compare(
        &self,
        key: &OpKey,
        generic: CompareLaneFn<E>,
        a: &[E],
        b: &[E],
    ) -> Box<[bool]> {
        let mut out = vec![false; a.len()];
        match self.lookup(key) {
            Some(Kernel::Compare(kernel)) => kernel(a, b, &mut out),
            _ => {
                for (i, ((o, &x), &y)) in out.iter_mut().zip(a).zip(b).enumerate() {
                    *o = generic(i, x, y);
                }
            }
        }
        out.into_boxed_slice()
    }
}

impl<E: LaneElement> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("lane", &E::LANE_TYPE)
            .field("resolver", &self.resolver_name())
            .field("cached_entries", &self.cached_entries())
            .finish()
    }
}
