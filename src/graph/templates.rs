// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Keyword-driven workflow templates.
//!
//! The classifier checks the lowercased description in priority order
//! (box/cube, cylinder, loft/surface) and falls back to a generic script
//! template, so every description yields exactly one workflow.

use serde_json::json;

use crate::observability::messages::workflow::WorkflowBuilt;
use crate::observability::messages::StructuredLog;
use crate::protocol::{ParamDecl, Parameters};

use super::node::{NodeSpec, ScriptSpec};
use super::workflow::{Workflow, WorkflowBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Box,
    Cylinder,
    Loft,
    Generic,
}

impl ShapeKind {
    pub fn classify(description: &str) -> Self {
        let description = description.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|w| description.contains(w));

        if mentions(&["box", "cube"]) {
            ShapeKind::Box
        } else if mentions(&["cylinder"]) {
            ShapeKind::Cylinder
        } else if mentions(&["loft", "surface"]) {
            ShapeKind::Loft
        } else {
            ShapeKind::Generic
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Cylinder => "cylinder",
            ShapeKind::Loft => "loft",
            ShapeKind::Generic => "generic",
        }
    }
}

const HEIGHT_VECTOR_CODE: &str = "import Rhino.Geometry as rg\nvector = rg.Vector3d(0, 0, height)\n";

const CUSTOM_GEOMETRY_CODE: &str = "import Rhino.Geometry as rg\n\
base = rg.Circle(rg.Plane.WorldXY, param1)\n\
geometry = rg.Cylinder(base, param2).ToBrep(True, True)\n";

/// Caller-supplied value for `name`, or the template default.
fn slider(parameters: &Parameters, name: &str, default: i64) -> NodeSpec {
    NodeSpec::slider(parameters.get(name).cloned().unwrap_or_else(|| json!(default)))
}

fn point() -> NodeSpec {
    NodeSpec::component("Construct Point", "Vector")
}

fn float_input(name: &str, description: &str) -> ParamDecl {
    ParamDecl::new(name, "float", description)
}

fn box_workflow(parameters: &Parameters) -> WorkflowBuilder {
    WorkflowBuilder::new()
        .parameter("Width", slider(parameters, "Width", 10))
        .parameter("Height", slider(parameters, "Height", 10))
        .parameter("Depth", slider(parameters, "Depth", 10))
        .component("BoxOrigin", point())
        .component("Box", NodeSpec::component("Box", "Surface"))
        .connect("Width.output", "Box.X Size")
        .connect("Height.output", "Box.Y Size")
        .connect("Depth.output", "Box.Z Size")
        .connect("BoxOrigin.Point", "Box.Base Point")
}

fn cylinder_workflow(parameters: &Parameters) -> WorkflowBuilder {
    WorkflowBuilder::new()
        .parameter("Radius", slider(parameters, "Radius", 5))
        .parameter("Height", slider(parameters, "Height", 20))
        .component("BasePoint", point())
        .component("Circle", NodeSpec::component("Circle", "Curve"))
        .component("Cylinder", NodeSpec::component("Extrude", "Surface"))
        .connect("Radius.output", "Circle.Radius")
        .connect("BasePoint.Point", "Circle.Base")
        .connect("Circle.Circle", "Cylinder.Base")
        .connect("Height.output", "Cylinder.Direction")
}

fn loft_workflow(parameters: &Parameters) -> WorkflowBuilder {
    let height_vector = ScriptSpec {
        inputs: vec![float_input("height", "Height of the loft")],
        outputs: vec![ParamDecl::new("vector", "vector", "Height vector")],
        code: HEIGHT_VECTOR_CODE.to_string(),
    };

    WorkflowBuilder::new()
        .parameter("Points", slider(parameters, "Points", 5))
        .parameter("Height", slider(parameters, "Height", 20))
        .parameter("RadiusBottom", slider(parameters, "RadiusBottom", 10))
        .parameter("RadiusTop", slider(parameters, "RadiusTop", 5))
        .component("BasePoint", point())
        .component("TopPoint", point())
        .component("CircleBottom", NodeSpec::component("Circle", "Curve"))
        .component("CircleTop", NodeSpec::component("Circle", "Curve"))
        .component("Loft", NodeSpec::component("Loft", "Surface"))
        .script("HeightVector", height_vector)
        .connect("Height.output", "HeightVector.height")
        .connect("HeightVector.vector", "TopPoint.Z")
        .connect("RadiusBottom.output", "CircleBottom.Radius")
        .connect("RadiusTop.output", "CircleTop.Radius")
        .connect("BasePoint.Point", "CircleBottom.Base")
        .connect("TopPoint.Point", "CircleTop.Base")
        .connect("CircleBottom.Circle", "Loft.Curves")
        .connect("CircleTop.Circle", "Loft.Curves")
}

fn generic_workflow(parameters: &Parameters) -> WorkflowBuilder {
    let custom_geometry = ScriptSpec {
        inputs: vec![
            float_input("param1", "First parameter"),
            float_input("param2", "Second parameter"),
        ],
        outputs: vec![ParamDecl::new("geometry", "geometry", "Output geometry")],
        code: CUSTOM_GEOMETRY_CODE.to_string(),
    };

    WorkflowBuilder::new()
        .parameter("Parameter1", slider(parameters, "Parameter1", 10))
        .parameter("Parameter2", slider(parameters, "Parameter2", 20))
        .script("CustomGeometry", custom_geometry)
        .connect("Parameter1.output", "CustomGeometry.param1")
        .connect("Parameter2.output", "CustomGeometry.param2")
}

/// Build the template workflow matching `description`. Never fails.
///
/// ```
/// use grasshopper_dispatch::graph::build_workflow;
/// use grasshopper_dispatch::protocol::Parameters;
///
/// let workflow = build_workflow("A tall cylinder", &Parameters::new());
/// assert!(workflow.components.contains("Cylinder"));
/// assert_eq!(workflow.connections.len(), 4);
/// ```
pub fn build_workflow(description: &str, parameters: &Parameters) -> Workflow {
    let shape = ShapeKind::classify(description);
    let workflow = match shape {
        ShapeKind::Box => box_workflow(parameters),
        ShapeKind::Cylinder => cylinder_workflow(parameters),
        ShapeKind::Loft => loft_workflow(parameters),
        ShapeKind::Generic => generic_workflow(parameters),
    }
    .finish();

    WorkflowBuilt {
        template: shape.name(),
        parameters: workflow.parameters.len(),
        components: workflow.components.len(),
        scripts: workflow.scripts.len(),
        connections: workflow.connections.len(),
    }
    .log();

    workflow
}
