pub mod normalize_use_case;
