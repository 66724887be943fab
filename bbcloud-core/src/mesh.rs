//! Indexed triangle meshes and their decomposition into triangles

use crate::error::{Error, Result};
use crate::point::*;
use crate::triangle::Triangle;
use serde::{Deserialize, Serialize};

/// A triangle mesh with vertices and faces.
///
/// Face `f` occupies positions `3f`, `3f + 1` and `3f + 2` of the flat index
/// buffer returned by [`TriangleMesh::index_buffer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
}

/// Triangles decomposed from a mesh, plus the faces that could not be used
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub triangles: Vec<Triangle>,
    /// Faces with collinear corners, which carry no normal
    pub degenerate_faces: Vec<usize>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Create a mesh from a flat `xyz` position buffer and a flat index
    /// buffer holding three indices per triangle.
    pub fn from_flat(positions: &[f32], indices: &[u32]) -> Result<Self> {
        if positions.len() % 3 != 0 {
            return Err(Error::InvalidData(format!(
                "Position buffer length {} is not a multiple of 3",
                positions.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(Error::InvalidData(format!(
                "Index buffer length {} is not a multiple of 3",
                indices.len()
            )));
        }

        let vertices: Vec<Point3f> = positions
            .chunks_exact(3)
            .map(|c| Point3f::new(c[0], c[1], c[2]))
            .collect();
        let faces: Vec<[usize; 3]> = indices
            .chunks_exact(3)
            .map(|c| [c[0] as usize, c[1] as usize, c[2] as usize])
            .collect();

        let mesh = Self { vertices, faces };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3f) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }

    /// The faces flattened into an index buffer
    pub fn index_buffer(&self) -> Vec<usize> {
        self.faces.iter().flatten().copied().collect()
    }

    /// Check that every face references an existing vertex
    pub fn validate(&self) -> Result<()> {
        for (f, face) in self.faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&v| v >= self.vertices.len()) {
                return Err(Error::InvalidData(format!(
                    "Face {} references vertex {} but the mesh has {} vertices",
                    f,
                    bad,
                    self.vertices.len()
                )));
            }
        }
        Ok(())
    }

    /// Decompose the mesh into triangles, one per non-degenerate face
    pub fn triangles(&self) -> Result<Decomposition> {
        self.validate()?;

        let mut triangles = Vec::with_capacity(self.faces.len());
        let mut degenerate_faces = Vec::new();
        for (f, face) in self.faces.iter().enumerate() {
            let p0 = self.vertices[face[0]];
            let p1 = self.vertices[face[1]];
            let p2 = self.vertices[face[2]];
            match Triangle::new(p0, p1, p2, f, [3 * f, 3 * f + 1, 3 * f + 2]) {
                Some(t) => triangles.push(t),
                None => degenerate_faces.push(f),
            }
        }

        if !degenerate_faces.is_empty() {
            log::warn!(
                "{} degenerate faces dropped during mesh decomposition",
                degenerate_faces.len()
            );
        }

        Ok(Decomposition { triangles, degenerate_faces })
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
