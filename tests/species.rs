//! Species identity, shapes and species-level factories.

use lanewise::{LaneError, LaneType, Shape, Species, Vector};

/// Lane counts follow the shape width and the element size.
#[test]
fn test_lane_counts() {
    assert_eq!(Species::<i8>::of(Shape::S64).length(), 8);
    assert_eq!(Species::<i16>::of(Shape::S128).length(), 8);
    assert_eq!(Species::<f32>::of(Shape::S256).length(), 8);
    assert_eq!(Species::<u64>::of(Shape::S512).length(), 8);
    assert_eq!(Species::<f64>::of(Shape::S64).length(), 1);
    let max = Species::<i32>::of(Shape::Max);
    assert_eq!(max.length() * 32, Shape::Max.vector_bit_size());
}

/// One species per lane type and shape, compared by identity.
#[test]
fn test_species_identity() {
    let a = Species::<u8>::of(Shape::S128);
    let b = Species::<u8>::of(Shape::S128);
    assert_eq!(a, b);
    assert_ne!(a, Species::<u8>::of(Shape::S256));
    assert_ne!(Species::<u8>::of(Shape::Max), Species::<u8>::of(Shape::preferred()));
    assert_eq!(a.lane_type(), LaneType::U8);
    assert_eq!(a.vector_byte_size(), 16);
    assert_eq!(a.element_size(), 8);
}

/// Vectors of different species cannot be combined.
#[test]
fn test_incompatible_species() {
    let narrow = Species::<i32>::of(Shape::S128).broadcast(1);
    let wide = Species::<i32>::of(Shape::S256).broadcast(1);
    assert!(matches!(narrow.add(&wide), Err(LaneError::IncompatibleSpecies { .. })));
    assert!(matches!(
        narrow.blend(&wide, &narrow.species().mask_all(true)),
        Err(LaneError::IncompatibleSpecies { .. })
    ));
}

/// Shapes only exist for the supported widths.
#[test]
fn test_shape_for_bits() {
    assert_eq!(Shape::for_bits(256), Ok(Shape::S256));
    assert!(matches!(Shape::for_bits(96), Err(LaneError::ValueRange { .. })));
    assert!([128, 256, 512].contains(&Shape::preferred().vector_bit_size()));
}

/// Factories produce the documented lanes.
#[test]
fn test_factories() {
    let species = Species::<i16>::of(Shape::S128);
    assert_eq!(species.zero().to_array(), vec![0; 8]);
    assert_eq!(species.iota().to_array(), (0..8).collect::<Vec<i16>>());
    assert_eq!(species.broadcast_long(-300).map(|v| v.to_array()), Ok(vec![-300; 8]));
    assert!(species.broadcast_long(40_000).is_err());
    assert_eq!(species.loop_bound(21), 16);
    let squares = species.from_fn(|i| (i * i) as i16);
    assert_eq!(squares.lane(7), Ok(49));
    assert_eq!(
        Vector::from_values(species, &[1, 2, 3]).map(|v| v.length()),
        Err(LaneError::ValueRange {
            message: format!("3 lane values for {species}")
        })
    );
}

/// Index scales are limited by what a lane can hold.
#[test]
fn test_check_scale() {
    let bytes = Species::<i8>::of(Shape::S512);
    assert!(bytes.check_scale(2).is_ok());
    assert!(bytes.check_scale(3).is_err());
    assert!(bytes.check_scale(-2).is_ok());
    let unsigned = Species::<u8>::of(Shape::S64);
    assert!(unsigned.check_scale(-1).is_err());
    let floats = Species::<f32>::of(Shape::S64);
    assert!(floats.check_scale(1 << 24).is_ok());
    assert!(floats.check_scale((1 << 24) + 1).is_err());
}
