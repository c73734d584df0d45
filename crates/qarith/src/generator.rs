// Conformance fixture generator
//
// Produces ADD and SUB fixtures for each equivalence class the quantized
// arithmetic suite needs to cover:
//
//   SameParams          — one descriptor shared by both inputs and the output
//   DifferentScales     — inputs differ in scale only
//   DifferentZeroPoints — inputs differ in zero-point only
//   DistinctOutput      — output descriptor differs from both inputs
//   BroadcastRank1      — a rank-1 operand broadcast against a full tensor
//   ZeroSized           — an operand with a 0-sized dimension
//
// Scales are drawn from a power-of-two palette, which keeps the real-valued
// reference exact, so expected outputs can come straight from it.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use qarith_core::{QuantElement, QuantizationParams, QuantizedTensor, Result, Shape};

use crate::activation::FusedActivation;
use crate::config::{GeneratorConfig, KernelConfig};
use crate::fixtures::{Fixture, FixtureSet};
use crate::kernel::BinaryOp;
use crate::reference::reference_binary_op;

const SCALE_PALETTE: [f32; 6] = [0.125, 0.25, 0.5, 1.0, 2.0, 4.0];

/// A family of fixtures that exercises one way the kernel can go wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquivalenceClass {
    SameParams,
    DifferentScales,
    DifferentZeroPoints,
    DistinctOutput,
    BroadcastRank1,
    ZeroSized,
}

impl EquivalenceClass {
    pub const ALL: [EquivalenceClass; 6] = [
        EquivalenceClass::SameParams,
        EquivalenceClass::DifferentScales,
        EquivalenceClass::DifferentZeroPoints,
        EquivalenceClass::DistinctOutput,
        EquivalenceClass::BroadcastRank1,
        EquivalenceClass::ZeroSized,
    ];
}

impl fmt::Display for EquivalenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EquivalenceClass::SameParams => "same_params",
            EquivalenceClass::DifferentScales => "different_scales",
            EquivalenceClass::DifferentZeroPoints => "different_zero_points",
            EquivalenceClass::DistinctOutput => "distinct_output",
            EquivalenceClass::BroadcastRank1 => "broadcast_rank1",
            EquivalenceClass::ZeroSized => "zero_sized",
        };
        write!(f, "{}", s)
    }
}

/// Seeded generator of conformance fixtures.
pub struct ConformanceGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl ConformanceGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    /// Every class × {ADD, SUB} × `cases_per_class`.
    pub fn generate<T: QuantElement>(&mut self) -> Result<FixtureSet<T>> {
        let mut set = FixtureSet::new();
        for class in EquivalenceClass::ALL {
            set.extend(self.generate_class(class)?)?;
        }
        tracing::debug!(fixtures = set.len(), seed = self.config.seed, "generated fixtures");
        Ok(set)
    }

    /// Fixtures for a single class.
    pub fn generate_class<T: QuantElement>(
        &mut self,
        class: EquivalenceClass,
    ) -> Result<FixtureSet<T>> {
        let mut set = FixtureSet::new();
        for op in [BinaryOp::Add, BinaryOp::Sub] {
            for i in 0..self.config.cases_per_class {
                let name = format!("{}_{}_{}", op.to_string().to_lowercase(), class, i);
                set.add(self.fixture(name, class, op)?)?;
            }
        }
        Ok(set)
    }

    fn fixture<T: QuantElement>(
        &mut self,
        name: String,
        class: EquivalenceClass,
        op: BinaryOp,
    ) -> Result<Fixture<T>> {
        let (shape0, shape1) = self.shapes(class);
        let (p0, p1, out) = self.params::<T>(class);

        let input0 = self.tensor::<T>(shape0, p0)?;
        let input1 = self.tensor::<T>(shape1, p1)?;
        let activation = FusedActivation::from_code(self.config.activation_code)?;
        let config = KernelConfig::default()
            .max_rank(self.max_rank())
            .activation(activation);
        let expected = reference_binary_op(&input0, &input1, &out, op, &config)?;
        Fixture::new(name, op, input0, input1, expected)?
            .with_activation_code(self.config.activation_code)
    }

    fn max_rank(&self) -> usize {
        self.config.max_rank.max(1)
    }

    fn shapes(&mut self, class: EquivalenceClass) -> (Shape, Shape) {
        match class {
            EquivalenceClass::BroadcastRank1 => {
                let rank = match self.max_rank() {
                    1 => 1,
                    max => self.rng.gen_range(2..=max),
                };
                let full = self.shape(rank);
                let last = full.dims()[rank - 1];
                let short = if self.rng.gen_bool(0.5) {
                    Shape::from(last)
                } else {
                    Shape::from(1)
                };
                if self.rng.gen_bool(0.5) {
                    (full, short)
                } else {
                    (short, full)
                }
            }
            EquivalenceClass::ZeroSized => {
                let rank = self.rng.gen_range(1..=self.max_rank());
                let mut dims = self.shape(rank).dims().to_vec();
                let zero_at = self.rng.gen_range(0..rank);
                dims[zero_at] = 0;
                // Partner collapses random dims (possibly the zero one) to 1.
                let partner: Vec<usize> = dims
                    .iter()
                    .map(|&d| if self.rng.gen_bool(0.5) { 1 } else { d })
                    .collect();
                (Shape::new(dims), Shape::new(partner))
            }
            _ => {
                let rank = self.rng.gen_range(1..=self.max_rank());
                let shape = self.shape(rank);
                (shape.clone(), shape)
            }
        }
    }

    fn shape(&mut self, rank: usize) -> Shape {
        let max_dim = self.config.max_dim.max(1);
        Shape::new((0..rank).map(|_| self.rng.gen_range(1..=max_dim)).collect())
    }

    fn scale(&mut self) -> f32 {
        SCALE_PALETTE[self.rng.gen_range(0..SCALE_PALETTE.len())]
    }

    fn zero_point<T: QuantElement>(&mut self) -> i32 {
        self.rng.gen_range(T::qmin()..=T::qmax())
    }

    fn descriptor<T: QuantElement>(&mut self) -> QuantizationParams {
        let scale = self.scale();
        let zp = self.zero_point::<T>();
        QuantizationParams::new(scale, zp).with_dtype(T::DTYPE)
    }

    fn params<T: QuantElement>(
        &mut self,
        class: EquivalenceClass,
    ) -> (QuantizationParams, QuantizationParams, QuantizationParams) {
        let base = self.descriptor::<T>();
        match class {
            EquivalenceClass::SameParams
            | EquivalenceClass::BroadcastRank1
            | EquivalenceClass::ZeroSized => (base, base, base),
            EquivalenceClass::DifferentScales => {
                let mut other = base;
                while other.scale == base.scale {
                    other.scale = self.scale();
                }
                (base, other, base)
            }
            EquivalenceClass::DifferentZeroPoints => {
                let mut other = base;
                while other.zero_point == base.zero_point {
                    other.zero_point = self.zero_point::<T>();
                }
                (base, other, base)
            }
            EquivalenceClass::DistinctOutput => {
                let p1 = self.descriptor::<T>();
                let mut out = self.descriptor::<T>();
                while out == base || out == p1 {
                    out = self.descriptor::<T>();
                }
                (base, p1, out)
            }
        }
    }

    fn tensor<T: QuantElement>(
        &mut self,
        shape: Shape,
        params: QuantizationParams,
    ) -> Result<QuantizedTensor<T>> {
        let data = (0..shape.elem_count())
            .map(|_| T::saturate_from_i32(self.rng.gen_range(T::qmin()..=T::qmax())))
            .collect();
        QuantizedTensor::new(shape, data, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FixtureVariant;

    #[test]
    fn test_generates_every_class_and_op() {
        let config = GeneratorConfig::default().cases_per_class(2);
        let set = ConformanceGenerator::new(config).generate::<i8>().unwrap();
        assert_eq!(set.len(), EquivalenceClass::ALL.len() * 2 * 2);
        assert!(set.get("sub_broadcast_rank1_0").is_some());
        assert!(set.get("add_zero_sized_1").is_some());
    }

    #[test]
    fn test_same_seed_same_fixtures() {
        let a = ConformanceGenerator::new(GeneratorConfig::default().seed(42))
            .generate::<i8>()
            .unwrap();
        let b = ConformanceGenerator::new(GeneratorConfig::default().seed(42))
            .generate::<i8>()
            .unwrap();
        assert!(a.iter().eq(b.iter()));
    }

    #[test]
    fn test_class_invariants() {
        let mut gen = ConformanceGenerator::new(GeneratorConfig::default().cases_per_class(8));

        for f in gen.generate_class::<i8>(EquivalenceClass::ZeroSized).unwrap().iter() {
            assert!(f.expected.is_empty(), "{}", f.name);
            assert!(f.input0.is_empty());
        }
        for f in gen
            .generate_class::<i8>(EquivalenceClass::DifferentScales)
            .unwrap()
            .iter()
        {
            assert_ne!(f.input0.params().scale, f.input1.params().scale);
            assert_eq!(f.input0.params().zero_point, f.input1.params().zero_point);
        }
        for f in gen
            .generate_class::<i8>(EquivalenceClass::BroadcastRank1)
            .unwrap()
            .iter()
        {
            assert!(f.input0.rank() == 1 || f.input1.rank() == 1);
            assert!(f.expected.rank() >= 2);
        }
    }

    #[test]
    fn test_generated_fixtures_pass_the_kernel() {
        let mut gen = ConformanceGenerator::new(GeneratorConfig::default().seed(7));
        let set = gen.generate::<i8>().unwrap();
        for variant in [FixtureVariant::Direct, FixtureVariant::AllInputsAsInternal] {
            for outcome in set.run(variant, &KernelConfig::default()) {
                assert!(outcome.passed, "{outcome:?}");
            }
        }
    }

    #[test]
    fn test_zero_limits_set_directly_still_generate() {
        let config = GeneratorConfig {
            max_rank: 0,
            max_dim: 0,
            ..GeneratorConfig::default()
        };
        let set = ConformanceGenerator::new(config).generate::<i8>().unwrap();
        for f in set.iter() {
            assert!(f.input0.rank() <= 1 && f.input1.rank() <= 1, "{}", f.name);
            assert!(f.input0.dims().iter().all(|&d| d <= 1));
        }
        for outcome in set.run(FixtureVariant::Direct, &KernelConfig::default()) {
            assert!(outcome.passed, "{outcome:?}");
        }
    }

    #[test]
    fn test_activation_code_reaches_every_fixture() {
        let config = GeneratorConfig::default().activation_code(3);
        let set = ConformanceGenerator::new(config).generate::<i8>().unwrap();
        for f in set.iter() {
            assert_eq!(f.activation, FusedActivation::Relu6);
            let (lo, hi) = FusedActivation::Relu6.quantized_range(&f.output_params);
            assert!(f.expected.data().iter().all(|&q| (lo..=hi).contains(&(q as i32))));
        }
        for outcome in set.run(FixtureVariant::AllInputsAsInternal, &KernelConfig::default()) {
            assert!(outcome.passed, "{outcome:?}");
        }

        let bad = GeneratorConfig::default().activation_code(7);
        assert_eq!(
            ConformanceGenerator::new(bad).generate::<i8>().unwrap_err(),
            qarith_core::Error::UnsupportedActivation(7)
        );
    }

    #[test]
    fn test_unsigned_generation() {
        let mut gen = ConformanceGenerator::new(GeneratorConfig::default().cases_per_class(1));
        let set = gen.generate::<u8>().unwrap();
        for outcome in set.run(FixtureVariant::Direct, &KernelConfig::default()) {
            assert!(outcome.passed, "{outcome:?}");
        }
    }
}
