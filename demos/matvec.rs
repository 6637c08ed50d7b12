use clap::Parser;
use he_matvec::{
    ckks::SimulatedCkks, Config, HomomorphicBackend, MatVecKernel, PlaintextMatrix, PlaintextVector,
    ReductionStrategy,
};

/// Encrypted matrix-vector product on the CKKS simulator.
///
/// Prints `result[c] = sum_r M[r][c] * v[r]` for every column `c`, next to
/// the same product computed in the clear.
#[derive(Parser, Debug)]
struct Args {
    /// TOML file with [scheme] and [kernel] sections
    #[arg(long)]
    config: Option<String>,

    /// Matrix rows separated by ';', entries by ','
    #[arg(long, value_parser = parse_matrix, default_value = "0,1,2,3;4,5,6,7;8,9,10,11;12,13,14,15")]
    matrix: PlaintextMatrix,

    /// One weight per matrix row
    #[arg(long, value_parser = parse_vector, default_value = "1,2,3,4")]
    vector: PlaintextVector,

    /// Overrides the reduction of the config file: linear or logarithmic
    #[arg(long, value_parser = parse_reduction)]
    reduction: Option<ReductionStrategy>,

    /// Seed of the noise sampler
    #[arg(long, default_value = "matvec")]
    seed: String,
}

fn parse_vector(s: &str) -> Result<PlaintextVector, String> {
    s.split(',')
        .map(|x| x.trim().parse::<f64>().map_err(|e| format!("{x:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()
        .map(PlaintextVector::from)
}

fn parse_matrix(s: &str) -> Result<PlaintextMatrix, String> {
    let rows = s
        .split(';')
        .map(|row| parse_vector(row).map(PlaintextVector::into_inner))
        .collect::<Result<Vec<_>, _>>()?;
    PlaintextMatrix::new(rows).map_err(|e| e.to_string())
}

fn parse_reduction(s: &str) -> Result<ReductionStrategy, String> {
    match s {
        "linear" => Ok(ReductionStrategy::Linear),
        "logarithmic" => Ok(ReductionStrategy::Logarithmic),
        _ => Err(format!("unknown reduction {s:?}, expected linear or logarithmic")),
    }
}

fn main() -> he_matvec::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_file(false)
        .with_line_number(false)
        .without_time()
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(reduction) = args.reduction {
        config.kernel.reduction = reduction;
    }

    let backend = SimulatedCkks::new(config.scheme.clone(), args.seed.as_bytes())?;
    let offsets = MatVecKernel::new(&backend, config.kernel.clone()).required_rotations(args.matrix.rows());
    let backend = backend.with_rotations(&offsets);
    let kernel = MatVecKernel::new(&backend, config.kernel.clone());

    println!(
        "slots: {}, max level: {}, rotation keys: {:?}",
        backend.slot_capacity(),
        backend.max_level(),
        offsets
    );
    let res = kernel.multiply(&args.matrix, &args.vector)?;
    let expected = args.matrix.transpose_mul(&args.vector)?;
    println!("encrypted: {:?}", res.as_slice());
    println!("in clear:  {:?}", expected.as_slice());
    Ok(())
}
