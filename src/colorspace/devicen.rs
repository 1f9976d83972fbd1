use super::{build_converter, ColorSpaceDescriptor, Converter};
use crate::error::Result;
use crate::function::{build_function, FunctionDescriptor};

/// DeviceN color space descriptor: N tint components mapped through a
/// PDF function (C3) into an alternate color space.
#[derive(Debug, Clone)]
pub struct DeviceNColorSpace {
    pub colorant_names: Vec<String>,
    pub colorant_count: usize,
    pub alternate: Box<ColorSpaceDescriptor>,
    pub tint_transform: FunctionDescriptor,
}

pub(crate) fn build_converter(cs: &DeviceNColorSpace) -> Result<Converter> {
    let function = build_function(&cs.tint_transform)?;
    let base = build_converter(&cs.alternate)?;
    Ok(Converter::TintTransform {
        function,
        base: Box::new(base),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderingIntent;

    #[test]
    fn two_colorant_devicen_into_device_cmyk() {
        let cs = DeviceNColorSpace {
            colorant_names: vec!["Spot1".to_string(), "Spot2".to_string()],
            colorant_count: 2,
            alternate: Box::new(ColorSpaceDescriptor::DeviceCmyk),
            tint_transform: FunctionDescriptor {
                function_type: 4,
                domain: vec![0.0, 1.0, 0.0, 1.0],
                range: Some(vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]),
                postscript_source: b"{ pop pop 0 0 1 1 }".to_vec(),
                ..Default::default()
            },
        };
        let converter = build_converter(&cs).unwrap();
        let out = converter.to_srgb(&[0.3, 0.7], RenderingIntent::RelativeColorimetric);
        assert_eq!(out[3], 255);
    }
}
