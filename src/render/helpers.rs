use crate::utils::time;
use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};

fn str_param<'a>(h: &'a Helper, index: usize) -> &'a str {
    h.param(index).and_then(|v| v.value().as_str()).unwrap_or("")
}

/// `{{format_date show_info.start_time}}`
pub fn format_date_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&time::format_date(str_param(h, 0)))?;
    Ok(())
}

/// `{{runtime show_info.end_time show_info.start_time}}`
pub fn runtime_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&time::runtime(str_param(h, 0), str_param(h, 1)))?;
    Ok(())
}

pub fn simple_time_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&time::simple_time(str_param(h, 0)))?;
    Ok(())
}

/// `{{distance distance_m @root.units}}`
pub fn distance_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let meters = h.param(0).and_then(|v| v.value().as_f64()).unwrap_or(0.0);
    out.write(&format_distance(meters, str_param(h, 1) == "metric"))?;
    Ok(())
}

/// Walking distance label: feet or miles, meters or kilometers.
pub fn format_distance(meters: f64, metric: bool) -> String {
    if metric {
        if meters < 1000.0 {
            format!("{} m", meters.round() as i64)
        } else {
            format!("{:.1} km", meters / 1000.0)
        }
    } else {
        let feet = meters * 3.28084;
        if feet < 1000.0 {
            format!("{} ft", feet.round() as i64)
        } else {
            format!("{:.1} mi", meters / 1609.344)
        }
    }
}

pub fn register_helpers(handlebars: &mut Handlebars) {
    handlebars.register_helper("format_date", Box::new(format_date_helper));
    handlebars.register_helper("runtime", Box::new(runtime_helper));
    handlebars.register_helper("simple_time", Box::new(simple_time_helper));
    handlebars.register_helper("distance", Box::new(distance_helper));
}
