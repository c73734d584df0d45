// Fixtures — named ADD/SUB test vectors and a runner
//
// A FixtureSet is an ordinary value built by whoever runs the suite; there
// is no process-wide registry. Each fixture stores both inputs, the output
// descriptor and the expected output codes.
//
// VARIANTS:
//
//   Direct             — run the op on the inputs as given
//   AllInputsAsInternal — first produce every compatible input as the
//                         output of `input ADD [zero_point]` (a shape-[1]
//                         constant holding the input's own zero-point, so
//                         real 0.0), then run the op. The result must not
//                         change. This mirrors how a graph runtime would
//                         see the inputs as intermediate tensors instead of
//                         constants; it is purely a harness concern.

use std::collections::HashMap;

use rayon::prelude::*;

use qarith_core::{bail, QuantElement, QuantizationParams, QuantizedTensor, Result, Shape};

use crate::activation::FusedActivation;
use crate::config::{KernelConfig, DEFAULT_MAX_RANK};
use crate::kernel::{binary_op, BinaryOp};

/// One named test vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture<T: QuantElement> {
    pub name: String,
    pub op: BinaryOp,
    pub activation: FusedActivation,
    pub input0: QuantizedTensor<T>,
    pub input1: QuantizedTensor<T>,
    pub output_params: QuantizationParams,
    pub expected: QuantizedTensor<T>,
}

/// How a fixture's inputs reach the op under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureVariant {
    Direct,
    AllInputsAsInternal,
}

/// Result of running one fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureOutcome {
    pub name: String,
    pub variant: FixtureVariant,
    pub passed: bool,
    /// First output position whose code differs from the expectation.
    pub first_mismatch: Option<usize>,
    /// Error raised by the kernel, if any.
    pub error: Option<String>,
}

/// Whether an input may be routed through the dummy ADD.
fn compatible_with_add<T: QuantElement>(t: &QuantizedTensor<T>) -> bool {
    t.rank() <= DEFAULT_MAX_RANK && !t.is_empty()
}

/// `input ADD [zero_point]`: same codes, produced by the kernel.
fn as_internal<T: QuantElement>(
    input: &QuantizedTensor<T>,
    config: &KernelConfig,
) -> Result<QuantizedTensor<T>> {
    if !compatible_with_add(input) {
        return Ok(input.clone());
    }
    let params = *input.params();
    let dummy = QuantizedTensor::filled_with_zero(1, params)?;
    let passthrough = KernelConfig {
        activation: FusedActivation::None,
        ..config.clone()
    };
    binary_op(input, &dummy, &params, BinaryOp::Add, &passthrough)
}

impl<T: QuantElement> Fixture<T> {
    /// Build a fixture. The expected tensor carries the output descriptor
    /// and must have the broadcast shape of the inputs.
    pub fn new(
        name: impl Into<String>,
        op: BinaryOp,
        input0: QuantizedTensor<T>,
        input1: QuantizedTensor<T>,
        expected: QuantizedTensor<T>,
    ) -> Result<Self> {
        let name = name.into();
        let out_shape = Shape::broadcast_shape(input0.shape(), input1.shape())?;
        if expected.shape() != &out_shape {
            bail!(
                "fixture {name}: expected shape {} but inputs broadcast to {out_shape}",
                expected.shape()
            );
        }
        let output_params = *expected.params();
        Ok(Self {
            name,
            op,
            activation: FusedActivation::None,
            input0,
            input1,
            output_params,
            expected,
        })
    }

    pub fn with_activation(mut self, activation: FusedActivation) -> Self {
        self.activation = activation;
        self
    }

    /// Attach the activation given as the op's scalar operand code.
    pub fn with_activation_code(self, code: i32) -> Result<Self> {
        Ok(self.with_activation(FusedActivation::from_code(code)?))
    }

    /// Evaluate the op for this fixture under `variant`.
    pub fn evaluate(
        &self,
        variant: FixtureVariant,
        config: &KernelConfig,
    ) -> Result<QuantizedTensor<T>> {
        let config = config.clone().activation(self.activation);
        match variant {
            FixtureVariant::Direct => binary_op(
                &self.input0,
                &self.input1,
                &self.output_params,
                self.op,
                &config,
            ),
            FixtureVariant::AllInputsAsInternal => {
                let input0 = as_internal(&self.input0, &config)?;
                let input1 = as_internal(&self.input1, &config)?;
                binary_op(&input0, &input1, &self.output_params, self.op, &config)
            }
        }
    }

    /// Evaluate and compare against the expected codes.
    pub fn run(&self, variant: FixtureVariant, config: &KernelConfig) -> FixtureOutcome {
        let outcome = match self.evaluate(variant, config) {
            Ok(actual) => {
                let first_mismatch = if actual.dims() != self.expected.dims() {
                    Some(0)
                } else {
                    actual
                        .data()
                        .iter()
                        .zip(self.expected.data())
                        .position(|(a, e)| a != e)
                };
                FixtureOutcome {
                    name: self.name.clone(),
                    variant,
                    passed: first_mismatch.is_none(),
                    first_mismatch,
                    error: None,
                }
            }
            Err(e) => FixtureOutcome {
                name: self.name.clone(),
                variant,
                passed: false,
                first_mismatch: None,
                error: Some(e.to_string()),
            },
        };

        if outcome.passed {
            tracing::debug!(fixture = %self.name, ?variant, "fixture passed");
        } else {
            tracing::warn!(
                fixture = %self.name,
                ?variant,
                first_mismatch = ?outcome.first_mismatch,
                error = ?outcome.error,
                "fixture failed"
            );
        }
        outcome
    }
}

/// A caller-owned, ordered collection of uniquely named fixtures.
#[derive(Debug, Clone, Default)]
pub struct FixtureSet<T: QuantElement> {
    fixtures: Vec<Fixture<T>>,
    by_name: HashMap<String, usize>,
}

impl<T: QuantElement> FixtureSet<T> {
    pub fn new() -> Self {
        Self {
            fixtures: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Add a fixture. Names must be unique within the set.
    pub fn add(&mut self, fixture: Fixture<T>) -> Result<()> {
        if self.by_name.contains_key(&fixture.name) {
            bail!("duplicate fixture name: {}", fixture.name);
        }
        self.by_name
            .insert(fixture.name.clone(), self.fixtures.len());
        self.fixtures.push(fixture);
        Ok(())
    }

    /// Add every fixture from another set.
    pub fn extend(&mut self, other: FixtureSet<T>) -> Result<()> {
        for f in other.fixtures {
            self.add(f)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Fixture<T>> {
        self.by_name.get(name).map(|&i| &self.fixtures[i])
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fixture<T>> {
        self.fixtures.iter()
    }

    /// Run every fixture under `variant`. Fixtures are independent, so they
    /// run in parallel; outcomes come back in insertion order.
    pub fn run(&self, variant: FixtureVariant, config: &KernelConfig) -> Vec<FixtureOutcome> {
        self.fixtures
            .par_iter()
            .map(|f| f.run(variant, config))
            .collect()
    }
}

impl FixtureSet<i8> {
    /// Literal regression vectors for signed 8-bit ADD/SUB.
    pub fn regression() -> Result<Self> {
        let mut set = FixtureSet::new();
        let p = QuantizationParams::new;

        // Broadcast [1, 2] against [2, 2], shared descriptor
        let params = p(1.0, -128);
        set.add(Fixture::new(
            "sub_broadcast_1x2_2x2",
            BinaryOp::Sub,
            QuantizedTensor::new((1, 2), vec![-28, 72], params)?,
            QuantizedTensor::new((2, 2), vec![-127, -126, -125, -124], params)?,
            QuantizedTensor::new((2, 2), vec![-29, 70, -31, 68], params)?,
        )?)?;

        // Second operand must be rescaled from 0.01 to 1.0 before the
        // subtraction; subtracting raw codes would saturate.
        set.add(Fixture::new(
            "sub_rescale_scale_0_01",
            BinaryOp::Sub,
            QuantizedTensor::new(4, vec![2, 12, -8, 27], p(1.0, -8))?,
            QuantizedTensor::new(4, vec![92, 52, -8, 112], p(0.01, -8))?,
            QuantizedTensor::new(4, vec![1, 11, -8, 26], p(1.0, -8))?,
        )?)?;

        // Distinct descriptors on every operand; the last element sits
        // exactly on a half step (52.5) and rounds away from zero.
        set.add(Fixture::new(
            "add_distinct_output_params",
            BinaryOp::Add,
            QuantizedTensor::new(3, vec![-100, 0, 100], p(0.5, -100))?,
            QuantizedTensor::new(3, vec![10, 20, 30], p(0.25, 10))?,
            QuantizedTensor::new(3, vec![-128, -102, -75], p(2.0, -128))?,
        )?)?;

        // Out-of-range results clamp, never wrap
        let params = p(1.0, 0);
        set.add(Fixture::new(
            "sub_saturates",
            BinaryOp::Sub,
            QuantizedTensor::new(2, vec![127, -128], params)?,
            QuantizedTensor::new(2, vec![-128, 127], params)?,
            QuantizedTensor::new(2, vec![127, -128], params)?,
        )?)?;

        // Zero-sized operand flows through with an empty result
        set.add(Fixture::new(
            "sub_zero_sized",
            BinaryOp::Sub,
            QuantizedTensor::new((0, 2), vec![], p(0.5, 0))?,
            QuantizedTensor::new(2, vec![1, 2], p(0.5, 0))?,
            QuantizedTensor::new((0, 2), vec![], p(0.5, 0))?,
        )?)?;

        Ok(set)
    }
}
