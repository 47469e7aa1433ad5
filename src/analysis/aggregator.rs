//! Prefix aggregation over scene entities.
//!
//! This module filters entities by name prefix and visibility and sums
//! the selected per-entity scalar across the matching set.

use crate::models::{AggregationResult, Entity, Operation};

/// Whether an entity takes part in an aggregation for `prefix`.
///
/// The match is a case-sensitive starts-with; an empty prefix matches every
/// visible entity.
pub fn matches(entity: &Entity, prefix: &str) -> bool {
    entity.visible && entity.name.starts_with(prefix)
}

/// Aggregate `operation` over every visible entity whose name starts with `prefix`.
///
/// An empty match is a valid outcome with a value of `0.0`.
pub fn aggregate(entities: &[Entity], prefix: &str, operation: Operation) -> AggregationResult {
    let matched_entities: Vec<Entity> = entities
        .iter()
        .filter(|e| matches(e, prefix))
        .cloned()
        .collect();

    let value = matched_entities
        .iter()
        .map(|e| operation.scalar(&e.dimensions))
        .fold(0.0, |acc, v| acc + v);

    AggregationResult {
        value,
        matched_count: matched_entities.len(),
        matched_entities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dimensions;

    fn create_test_scene() -> Vec<Entity> {
        vec![
            Entity::new("Box1", Dimensions::new(1.0, 2.0, 3.0)),
            Entity::new("Box2", Dimensions::new(4.0, 5.0, 6.0)),
            Entity::hidden("Box3", Dimensions::new(100.0, 100.0, 100.0)),
            Entity::new("box4", Dimensions::new(7.0, 7.0, 7.0)),
            Entity::new("Cylinder.Box", Dimensions::new(8.0, 8.0, 8.0)),
        ]
    }

    #[test]
    fn test_single_entity_operations() {
        let scene = vec![Entity::new("Cube", Dimensions::new(2.0, 3.0, 4.0))];

        assert_eq!(aggregate(&scene, "", Operation::SumX).value, 2.0);
        assert_eq!(aggregate(&scene, "", Operation::AreaXY).value, 6.0);
        assert_eq!(aggregate(&scene, "", Operation::VolumeXYZ).value, 24.0);
        assert_eq!(aggregate(&scene, "", Operation::MaxDimension).value, 4.0);
    }

    #[test]
    fn test_prefix_and_visibility_filter() {
        let scene = create_test_scene();
        let result = aggregate(&scene, "Box", Operation::SumX);

        // Box3 is hidden, box4 differs in case, Cylinder.Box only contains the prefix
        assert_eq!(result.matched_count, 2);
        assert_eq!(result.matched_entities.len(), result.matched_count);
        assert_eq!(result.value, 5.0);

        let names: Vec<_> = result.matched_entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Box1", "Box2"]);
    }

    #[test]
    fn test_empty_prefix_matches_all_visible() {
        let scene = create_test_scene();
        let result = aggregate(&scene, "", Operation::SumY);

        assert_eq!(result.matched_count, 4);
        assert_eq!(result.value, 2.0 + 5.0 + 7.0 + 8.0);
    }

    #[test]
    fn test_empty_match_is_zero() {
        let scene = create_test_scene();
        let result = aggregate(&scene, "Sphere", Operation::VolumeXYZ);
        assert_eq!(result.value, 0.0);
        assert_eq!(result.matched_count, 0);
        assert!(result.is_empty());

        let result = aggregate(&[], "", Operation::AreaYZ);
        assert_eq!(result.value, 0.0);
        assert!(result.matched_entities.is_empty());
    }

    #[test]
    fn test_sum_of_areas() {
        let scene = create_test_scene();
        assert_eq!(aggregate(&scene, "Box", Operation::AreaXZ).value, 3.0 + 24.0);
        assert_eq!(aggregate(&scene, "Box", Operation::AreaYZ).value, 6.0 + 30.0);
        assert_eq!(aggregate(&scene, "Box", Operation::MaxDimension).value, 3.0 + 6.0);
    }

    #[test]
    fn test_matches() {
        let entity = Entity::new("Wall_North", Dimensions::new(1.0, 1.0, 1.0));
        assert!(matches(&entity, "Wall"));
        assert!(matches(&entity, "Wall_North"));
        assert!(!matches(&entity, "wall"));
        assert!(!matches(&entity, "North"));
        assert!(!matches(&Entity::hidden("Wall", Dimensions::default()), "Wall"));
    }

    #[test]
    fn test_nan_propagates() {
        let scene = vec![
            Entity::new("A", Dimensions::new(f64::NAN, 1.0, 1.0)),
            Entity::new("B", Dimensions::new(1.0, 1.0, 1.0)),
        ];
        assert!(aggregate(&scene, "", Operation::SumX).value.is_nan());
        assert_eq!(aggregate(&scene, "", Operation::SumY).value, 2.0);
    }

    #[test]
    fn test_nan_propagates_through_products_and_max() {
        let scene = vec![Entity::new("A", Dimensions::new(f64::NAN, 1.0, 2.0))];

        for op in [
            Operation::AreaXY,
            Operation::AreaXZ,
            Operation::VolumeXYZ,
            Operation::MaxDimension,
        ] {
            assert!(aggregate(&scene, "", op).value.is_nan(), "{} should be NaN", op);
        }
        assert_eq!(aggregate(&scene, "", Operation::AreaYZ).value, 2.0);

        let scene = vec![Entity::new("B", Dimensions::new(1.0, 2.0, f64::NAN))];
        assert!(aggregate(&scene, "", Operation::MaxDimension).value.is_nan());
    }

    #[test]
    fn test_infinity_propagates() {
        let scene = vec![Entity::new("A", Dimensions::new(f64::INFINITY, 1.0, 2.0))];
        assert_eq!(aggregate(&scene, "", Operation::MaxDimension).value, f64::INFINITY);
        assert_eq!(aggregate(&scene, "", Operation::AreaXZ).value, f64::INFINITY);
    }
}
