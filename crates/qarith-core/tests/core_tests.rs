// Tests for qarith-core: broadcasting, strided walks, descriptors, tensors

use proptest::prelude::*;

use qarith_core::{Error, Layout, QuantDType, QuantizationParams, QuantizedTensor, Shape};

fn small_dims() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..4, 0..=4)
}

/// A shape and a partner that always broadcasts against it.
fn compatible_pair() -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    prop::collection::vec(1usize..5, 0..=4).prop_flat_map(|dims| {
        let rank = dims.len();
        (
            Just(dims),
            0..=rank,
            prop::collection::vec(any::<bool>(), rank),
        )
            .prop_map(|(dims, drop, collapse)| {
                let partner: Vec<usize> = dims
                    .iter()
                    .zip(&collapse)
                    .skip(drop)
                    .map(|(&d, &c)| if c { 1 } else { d })
                    .collect();
                (dims, partner)
            })
    })
}

proptest! {
    #[test]
    fn prop_broadcast_is_symmetric(a in small_dims(), b in small_dims()) {
        let (a, b) = (Shape::new(a), Shape::new(b));
        prop_assert_eq!(
            Shape::broadcast_shape(&a, &b).ok(),
            Shape::broadcast_shape(&b, &a).ok()
        );
    }

    #[test]
    fn prop_compatible_partner_broadcasts_to_full((full, partner) in compatible_pair()) {
        let full = Shape::new(full);
        let partner = Shape::new(partner);
        prop_assert_eq!(Shape::broadcast_shape(&full, &partner).unwrap(), full.clone());

        // Every broadcast read stays inside the partner's storage
        let layout = Layout::broadcast_to(&partner, &full).unwrap();
        prop_assert_eq!(layout.elem_count(), full.elem_count());
        for i in layout.strided_indices() {
            prop_assert!(i < partner.elem_count());
        }
    }

    #[test]
    fn prop_range_walk_matches_full_walk(
        (full, partner) in compatible_pair(),
        start in 0usize..300,
        len in 0usize..300,
    ) {
        let layout = Layout::broadcast_to(&Shape::new(partner), &Shape::new(full)).unwrap();
        let want: Vec<usize> = layout.strided_indices().skip(start).take(len).collect();
        let got: Vec<usize> = layout.strided_indices_range(start, len).collect();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn prop_negation_is_an_involution(
        codes in prop::collection::vec(-40i8..40, 0..16),
        zp in -40i32..40,
    ) {
        let params = QuantizationParams::new(0.75, zp);
        let t = QuantizedTensor::new(codes.len(), codes, params).unwrap();
        let neg = t.negated().unwrap();
        for (r, n) in t.dequantize().iter().zip(neg.dequantize()) {
            prop_assert_eq!(*r, -n);
        }
        prop_assert_eq!(neg.negated().unwrap(), t);
    }
}

#[test]
fn test_incompatible_shapes_name_both_operands() {
    let err = Shape::broadcast_shape(&Shape::from((2, 3)), &Shape::from(4)).unwrap_err();
    assert_eq!(
        err,
        Error::IncompatibleShapes {
            lhs: Shape::from((2, 3)),
            rhs: Shape::from(4),
        }
    );
}

#[test]
fn test_zero_sized_dims_broadcast() {
    let out = Shape::broadcast_shape(&Shape::from((0, 3)), &Shape::from(1)).unwrap();
    assert_eq!(out.dims(), &[0, 3]);
    assert!(out.is_empty());

    let out = Shape::broadcast_shape(&Shape::from((2, 1)), &Shape::from(0)).unwrap();
    assert_eq!(out.dims(), &[2, 0]);
    assert_eq!(out.elem_count(), 0);
}

#[test]
fn test_tensor_rejects_bad_descriptors() {
    let bad_scale = QuantizationParams::new(f32::NAN, 0);
    assert!(matches!(
        QuantizedTensor::<i8>::new(1, vec![0], bad_scale),
        Err(Error::InvalidScale { .. })
    ));

    let signed_zp_for_unsigned = QuantizationParams::new(1.0, -1).with_dtype(QuantDType::QUInt8);
    assert!(matches!(
        QuantizedTensor::<u8>::new(1, vec![0], signed_zp_for_unsigned),
        Err(Error::ZeroPointOutOfRange { min: 0, max: 255, .. })
    ));

    let unsigned_params = QuantizationParams::new(1.0, 0).with_dtype(QuantDType::QUInt8);
    assert!(matches!(
        QuantizedTensor::<i8>::new(1, vec![0], unsigned_params),
        Err(Error::DTypeMismatch { .. })
    ));

    assert!(matches!(
        QuantizedTensor::<i8>::new((2, 2), vec![0; 3], QuantizationParams::new(1.0, 0)),
        Err(Error::ElementCountMismatch { expected: 4, got: 3, .. })
    ));
}

#[test]
fn test_negation_out_of_range() {
    let t = QuantizedTensor::<i8>::new(2, vec![-128, 0], QuantizationParams::new(1.0, 0)).unwrap();
    assert!(t.negated().is_none());
}
