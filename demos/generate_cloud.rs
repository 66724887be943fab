//! Billboard cloud generation demo
//!
//! Builds a procedural mesh, runs one plane-search strategy on it and prints
//! the resulting billboards.

use anyhow::{Context, Result};
use bbcloud_core::{Point3f, TriangleMesh};
use bbcloud_search::{Algorithm, BillboardCloud, CloudGenerator, EngineConfig, PlaneSearchEngine};
use clap::{Parser, ValueEnum};
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    Greedy,
    Stochastic,
    Kmeans,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Shape {
    Cube,
    Sphere,
    Terrain,
}

/// Generate a billboard cloud for a procedural mesh.
#[derive(Parser, Debug)]
#[command(name = "generate_cloud")]
#[command(about = "Approximates a procedural mesh by textured planes")]
struct Args {
    /// Plane-search strategy
    #[arg(short, long, value_enum, default_value = "greedy")]
    algorithm: Strategy,

    /// Mesh to approximate
    #[arg(short, long, value_enum, default_value = "sphere")]
    shape: Shape,

    /// Mesh resolution (segments per side or per ring)
    #[arg(long, default_value_t = 16)]
    segments: usize,

    /// Error tolerance as a fraction of the bounding-sphere diameter
    #[arg(short, long, default_value_t = 0.01)]
    epsilon: f32,

    #[arg(long, default_value_t = 20)]
    theta_bins: usize,

    #[arg(long, default_value_t = 20)]
    phi_bins: usize,

    /// Trials per round of the stochastic search
    #[arg(long, default_value_t = 100)]
    iterations: usize,

    /// Target plane count of the k-means search
    #[arg(long, default_value_t = 50)]
    clusters: usize,

    /// Iteration bound of the k-means phases
    #[arg(long, default_value_t = 100)]
    max_iterations: usize,

    /// Texture size in pixels for the bounding-sphere diameter
    #[arg(long, default_value_t = 1024)]
    image_size: u32,

    /// Seed for the stochastic search
    #[arg(long)]
    seed: Option<u64>,

    /// Let planes also take neighbouring triangles inside their envelope
    #[arg(long)]
    crack_reduction: bool,

    /// Generate on a background thread and poll for the result
    #[arg(long)]
    background: bool,
}

impl Args {
    fn config(&self) -> EngineConfig {
        let algorithm = match self.algorithm {
            Strategy::Greedy => Algorithm::Greedy {
                epsilon_percentage: self.epsilon,
                theta_bins: self.theta_bins,
                phi_bins: self.phi_bins,
            },
            Strategy::Stochastic => Algorithm::Stochastic {
                epsilon_percentage: self.epsilon,
                iterations: self.iterations,
            },
            Strategy::Kmeans => Algorithm::KMeans {
                clusters: self.clusters,
                max_iterations: self.max_iterations,
            },
        };
        EngineConfig {
            algorithm,
            base_image_size: (self.image_size, self.image_size),
            crack_reduction: self.crack_reduction,
            seed: self.seed,
        }
    }
}

fn cube(segments: usize) -> TriangleMesh {
    let n = segments.max(1);
    let mut mesh = TriangleMesh::new();
    // Each face is a grid over (u, v) in [-0.5, 0.5]^2 at w = +-0.5
    for axis in 0..3 {
        for side in [-0.5f32, 0.5] {
            let base = mesh.vertex_count();
            for j in 0..=n {
                for i in 0..=n {
                    let u = i as f32 / n as f32 - 0.5;
                    let v = j as f32 / n as f32 - 0.5;
                    let mut p = [0.0; 3];
                    p[axis] = side;
                    p[(axis + 1) % 3] = u;
                    p[(axis + 2) % 3] = v;
                    mesh.add_vertex(Point3f::new(p[0], p[1], p[2]));
                }
            }
            for j in 0..n {
                for i in 0..n {
                    let a = base + j * (n + 1) + i;
                    let b = a + 1;
                    let c = a + n + 1;
                    let d = c + 1;
                    mesh.add_face([a, b, d]);
                    mesh.add_face([a, d, c]);
                }
            }
        }
    }
    mesh
}

fn sphere(segments: usize) -> TriangleMesh {
    let stacks = segments.max(3);
    let slices = 2 * stacks;
    let mut mesh = TriangleMesh::new();
    let top = mesh.add_vertex(Point3f::new(0.0, 0.0, 1.0));
    for s in 1..stacks {
        let phi = PI * s as f32 / stacks as f32;
        for l in 0..slices {
            let theta = 2.0 * PI * l as f32 / slices as f32;
            mesh.add_vertex(Point3f::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos()));
        }
    }
    let bottom = mesh.add_vertex(Point3f::new(0.0, 0.0, -1.0));

    let ring = |s: usize, l: usize| 1 + (s - 1) * slices + l % slices;
    for l in 0..slices {
        mesh.add_face([top, ring(1, l), ring(1, l + 1)]);
        mesh.add_face([bottom, ring(stacks - 1, l + 1), ring(stacks - 1, l)]);
    }
    for s in 1..stacks - 1 {
        for l in 0..slices {
            mesh.add_face([ring(s, l), ring(s + 1, l), ring(s + 1, l + 1)]);
            mesh.add_face([ring(s, l), ring(s + 1, l + 1), ring(s, l + 1)]);
        }
    }
    mesh
}

fn terrain(segments: usize) -> TriangleMesh {
    let size = segments.max(2) + 1;
    let mut vertices = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let fx = x as f32 / (size - 1) as f32 * PI;
            let fy = y as f32 / (size - 1) as f32 * PI;
            vertices.push(Point3f::new(x as f32, y as f32, (fx.sin() * fy.sin()) * 2.0));
        }
    }
    let mut faces = Vec::with_capacity((size - 1) * (size - 1) * 2);
    for y in 0..(size - 1) {
        for x in 0..(size - 1) {
            let tl = y * size + x;
            let tr = tl + 1;
            let bl = (y + 1) * size + x;
            let br = bl + 1;
            faces.push([tl, bl, tr]);
            faces.push([tr, bl, br]);
        }
    }
    TriangleMesh::from_vertices_and_faces(vertices, faces)
}

fn print_cloud(cloud: &BillboardCloud) {
    println!("\nBillboard cloud ({})", cloud.algorithm);
    println!("==============================");
    println!("- Planes: {}", cloud.plane_count());
    println!("- Skipped triangles: {}", cloud.skipped_triangles);
    println!("- Processing time: {:.3}s", cloud.processing_time);
    if let Some(epsilon) = cloud.epsilon {
        println!("- Tolerance: {:.5}", epsilon);
    }

    for (i, billboard) in cloud.billboards.iter().enumerate() {
        let n = billboard.plane.normal;
        let texture = billboard
            .texture_size
            .map(|t| format!("{}x{}", t.width, t.height))
            .unwrap_or_else(|| "unrenderable".to_string());
        println!(
            "  [{:3}] n=({:+.3}, {:+.3}, {:+.3}) d={:.3} triangles={:4} area={:.4} texture={} {:?}",
            i,
            n.x,
            n.y,
            n.z,
            billboard.plane.distance,
            billboard.triangles.len(),
            billboard.rectangle.area(),
            texture,
            billboard.membership
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mesh = match args.shape {
        Shape::Cube => cube(args.segments),
        Shape::Sphere => sphere(args.segments),
        Shape::Terrain => terrain(args.segments),
    };
    println!(
        "Created {:?} mesh with {} vertices and {} faces",
        args.shape,
        mesh.vertex_count(),
        mesh.face_count()
    );

    let config = args.config();
    let cloud = if args.background {
        let mut generator = CloudGenerator::new(config).context("Invalid engine configuration")?;
        generator.request(mesh)?;
        let mut polls = 0usize;
        let result = loop {
            if let Some(result) = generator.poll() {
                break result;
            }
            polls += 1;
            std::thread::sleep(std::time::Duration::from_millis(10));
        };
        log::info!("Background generation finished after {} polls", polls);
        result?
    } else {
        PlaneSearchEngine::new(config)
            .context("Invalid engine configuration")?
            .run(&mesh)
            .context("Billboard cloud generation failed")?
    };

    print_cloud(&cloud);
    Ok(())
}
