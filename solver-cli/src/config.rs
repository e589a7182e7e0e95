use anyhow::Context;
use heat_solver_core::SimParams;
use std::fs;
use std::path::Path;

/// Read and validate a JSON parameter file.
pub fn load_params(path: &Path) -> anyhow::Result<SimParams> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading parameter file {}", path.display()))?;
    parse_params(&text).with_context(|| format!("in parameter file {}", path.display()))
}

/// Fields absent from `text` keep the reference values.
pub fn parse_params(text: &str) -> anyhow::Result<SimParams> {
    let params: SimParams = serde_json::from_str(text)?;
    params.validate()?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_is_the_reference_configuration() {
        assert_eq!(parse_params("{}").unwrap(), SimParams::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let p = parse_params(r#"{ "num_intervals": 64, "time_step": 1e-6 }"#).unwrap();
        assert_eq!(p.num_intervals, 64);
        assert_eq!(p.time_step, 1e-6);
        assert_eq!(p.alpha_sq, SimParams::default().alpha_sq);
    }

    #[test]
    fn rejects_unknown_and_invalid_fields() {
        assert!(parse_params(r#"{ "steps": 10 }"#).is_err());
        assert!(parse_params(r#"{ "num_intervals": -3 }"#).is_err());

        let err = parse_params(r#"{ "hot_region_side": 1.0 }"#).unwrap_err();
        assert!(err.to_string().contains("hot_region_side"));
    }

    #[test]
    fn loads_from_disk_with_context() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "background_temp": 0.0, "hot_region_temp": 100.0 }}"#).unwrap();

        let p = load_params(file.path()).unwrap();
        assert_eq!(p.background_temp, 0.0);
        assert_eq!(p.hot_region_temp, 100.0);

        let missing = file.path().with_extension("absent");
        let err = load_params(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("reading parameter file"));
    }
}
