//! Vega-Lite v5 specification types.
//!
//! Only the subset the dashboard emits is modelled: inline data, a vertical
//! concatenation of panels, single or layered marks, an interval brush, and
//! field/aggregate/conditional encodings. `None` fields are omitted from the
//! JSON so the output matches what a hand-written spec would contain.

use serde::Serialize;
use serde_json::Value;

use crate::chart::AggregateOp;

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Name of the interval selection shared by every two-panel chart.
pub const BRUSH_PARAM: &str = "brush";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "$schema")]
    pub schema: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    pub data: InlineData,
    pub vconcat: Vec<Panel>,
}

impl ChartSpec {
    pub fn with_title(mut self, text: impl Into<String>) -> Self {
        self.title = Some(Title {
            text: text.into(),
            anchor: "middle",
        });
        self
    }

    /// The upper (brush-controlled) panel.
    pub fn detail(&self) -> Option<&Panel> {
        self.vconcat.first()
    }

    /// The lower (brush-owning) panel.
    pub fn overview(&self) -> Option<&Panel> {
        self.vconcat.get(1)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    pub anchor: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineData {
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Line,
    Rule,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark: Option<Mark>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub layer: Vec<Layer>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    pub encoding: Encoding,
    pub width: u32,
    pub height: u32,
}

impl Panel {
    pub fn single(mark: Mark, encoding: Encoding, width: u32, height: u32) -> Self {
        Self {
            mark: Some(mark),
            layer: Vec::new(),
            params: Vec::new(),
            encoding,
            width,
            height,
        }
    }

    /// Layered panel; `encoding` is shared by every layer.
    pub fn layered(layer: Vec<Layer>, encoding: Encoding, width: u32, height: u32) -> Self {
        Self {
            mark: None,
            layer,
            params: Vec::new(),
            encoding,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub mark: Mark,
    pub encoding: Encoding,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub select: Selection,
}

impl Param {
    /// Interval selection restricted to the x encoding.
    pub fn x_interval(name: &str) -> Self {
        Self {
            name: name.to_string(),
            select: Selection {
                kind: "interval",
                encodings: vec!["x"],
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub encodings: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Encoding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y2: Option<SecondaryChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorEncoding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tooltip: Vec<Channel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Temporal,
    Quantitative,
    Nominal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    pub field: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<AggregateOp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<Axis>,
}

impl Channel {
    pub fn new(field: impl Into<String>, kind: FieldType) -> Self {
        Self {
            field: field.into(),
            kind,
            aggregate: None,
            title: None,
            scale: None,
            axis: None,
        }
    }

    pub fn temporal(field: impl Into<String>) -> Self {
        Self::new(field, FieldType::Temporal)
    }

    pub fn quantitative(field: impl Into<String>) -> Self {
        Self::new(field, FieldType::Quantitative)
    }

    pub fn nominal(field: impl Into<String>) -> Self {
        Self::new(field, FieldType::Nominal)
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn aggregate(mut self, op: AggregateOp) -> Self {
        self.aggregate = Some(op);
        self
    }

    /// Let the axis float instead of starting at zero.
    pub fn unzeroed(mut self) -> Self {
        self.scale.get_or_insert_with(Scale::default).zero = Some(false);
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.axis = Some(Axis {
            format: Some(format.into()),
        });
        self
    }

    /// Bind the scale domain to an interval selection.
    pub fn domain_from(mut self, param: &str) -> Self {
        self.scale.get_or_insert_with(Scale::default).domain = Some(ParamDomain {
            param: param.to_string(),
            encoding: "x",
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecondaryChannel {
    pub field: String,
}

impl SecondaryChannel {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Scale {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<ParamDomain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDomain {
    pub param: String,
    pub encoding: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorEncoding {
    Field(Channel),
    Conditional {
        condition: ColorCondition,
        value: String,
    },
}

impl ColorEncoding {
    /// `if_true` where `test` holds, `otherwise` elsewhere.
    pub fn conditional(test: impl Into<String>, if_true: &str, otherwise: &str) -> Self {
        ColorEncoding::Conditional {
            condition: ColorCondition {
                test: test.into(),
                value: if_true.to_string(),
            },
            value: otherwise.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorCondition {
    pub test: String,
    pub value: String,
}

/// Stack `detail` over `overview` and link them with the shared brush.
///
/// The brush is an x-only interval selection owned by the overview panel;
/// the detail panel's x scale domain follows it. Every two-panel chart is
/// assembled here so the linkage cannot drift between chart types.
pub fn brush_linked(data: Vec<Value>, mut detail: Panel, mut overview: Panel) -> ChartSpec {
    if let Some(x) = detail.encoding.x.take() {
        detail.encoding.x = Some(x.domain_from(BRUSH_PARAM));
    }
    overview.params = vec![Param::x_interval(BRUSH_PARAM)];

    ChartSpec {
        schema: VEGA_LITE_SCHEMA,
        title: None,
        data: InlineData { values: data },
        vconcat: vec![detail, overview],
    }
}
