pub mod ids;

pub use ids::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_nil() {
        let nil = NodeID::nil();
        assert!(nil.is_nil());
        assert_eq!(nil.index(), 0);
        assert_eq!(nil.generation(), 0);
    }

    #[test]
    fn node_id_parts() {
        let id = NodeID::from_parts(7, 3);
        assert_eq!(id.index(), 7);
        assert_eq!(id.generation(), 3);
        assert!(!id.is_nil());
    }

    #[test]
    fn node_id_u64_roundtrip() {
        let cases: &[(u32, u32)] = &[
            (0, 0),
            (1, 0),
            (0, 1),
            (42, 9),
            (u32::MAX, 0),
            (0, u32::MAX),
            (u32::MAX, u32::MAX),
        ];
        for &(index, generation) in cases {
            let id = NodeID::from_parts(index, generation);
            assert_eq!(
                NodeID::from_u64(id.as_u64()),
                id,
                "roundtrip failed for index={index} generation={generation}"
            );
        }
    }

    #[test]
    fn image_id_nil_invariants() {
        let nil = ImageID::nil();
        assert!(nil.is_nil());
        assert_eq!(nil.index(), 0);
        assert_eq!(nil.generation(), 0);
    }

    #[test]
    fn font_id_display() {
        let id = FontID::from_parts(2, 1);
        assert_eq!(format!("{id}"), "2:1");
        assert_eq!(format!("{id:?}"), "FontID(2:1)");
    }

    #[test]
    fn ids_serialize_as_u64() {
        let id = ImageID::from_parts(5, 2);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, id.as_u64().to_string());
        let back: ImageID = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
