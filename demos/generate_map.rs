//! Example: Generate a dual mesh map from the command line
//!
//! ```text
//! cargo run --example generate_map -- --seed 42 --width 800 --height 600 --spacing 15
//! ```

use clap::Parser;
use dual_mesh_mapgen::*;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "generate_map")]
#[command(about = "Generate a Poisson-disk Voronoi dual mesh and print its statistics")]
struct Args {
    /// Seed for the sequence generator
    #[arg(short, long, default_value = "42")]
    seed: u32,

    /// Width of the map rectangle
    #[arg(short = 'W', long, default_value = "1000")]
    width: f64,

    /// Height of the map rectangle
    #[arg(short = 'H', long, default_value = "1000")]
    height: f64,

    /// Minimum distance between points (uses the Medium preset if not specified)
    #[arg(short = 'r', long)]
    spacing: Option<f64>,

    /// Candidates tried per active point before it is retired
    #[arg(short = 'k', long, default_value = "30")]
    max_tries: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = MapConfigBuilder::new(args.seed)
        .dimensions(args.width, args.height)?
        .max_tries(args.max_tries)?;
    if let Some(spacing) = args.spacing {
        builder = builder.spacing(spacing)?;
    }
    let config = builder.build()?;

    println!("Dual Mesh Map Generation");
    println!("========================\n");
    println!("Configuration:");
    println!("  Seed: {}", config.seed);
    println!("  Size: {} x {}", config.width, config.height);
    println!("  Density: {} (spacing {})", config.density.name(), config.spacing());
    println!("  Max tries: {}", config.max_tries);
    println!();

    let start = Instant::now();
    let map = MapMesh::generate(config)?;
    let elapsed = start.elapsed();

    let mesh = map.mesh();
    let closed = map.regions().iter().filter(|r| r.closed).count();
    let interior_edges = mesh.edges().filter(|e| !e.is_hull()).count();

    println!("Generated in {:.2?}", elapsed);
    println!(
        "  Regions: {} ({} closed, {} on the hull)",
        map.region_count(),
        closed,
        mesh.hull().len()
    );
    println!("  Triangles: {}", mesh.triangle_count());
    println!("  Edges: {} ({} interior)", mesh.edges().count(), interior_edges);

    let total_neighbors: usize = map.regions().iter().map(|r| r.neighbor_count()).sum();
    println!(
        "  Average neighbors: {:.2}",
        total_neighbors as f64 / map.region_count() as f64
    );

    let closed_area: f64 = map.regions().iter().map(|r| r.area()).sum();
    println!(
        "  Closed region area: {:.1} ({:.1}% of the map)",
        closed_area,
        closed_area / config.area() * 100.0
    );

    #[cfg(feature = "spatial-index")]
    {
        let center = DVec2::new(config.width / 2.0, config.height / 2.0);
        let region_id = map.find_region_at(center);
        println!("\nCenter {:?} -> region {}", center, region_id);
        println!(
            "  Regions within 2 hops: {}",
            map.find_regions_within_hops(region_id, 2).len()
        );
    }

    Ok(())
}
