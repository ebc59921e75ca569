use touchpath_core::geometry::Point;

/// Parses one checkpoint argument: `x,y` per finger, fingers separated by
/// `;` (e.g. `100,100;300,100`).
pub fn parse_checkpoint(arg: &str) -> Result<Vec<Point>, String> {
    arg.split(';')
        .map(str::trim)
        .enumerate()
        .map(|(finger, pair)| {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| format!("finger {} in '{}': expected 'x,y'", finger, arg))?;
            let coord = |v: &str| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|_| format!("finger {} in '{}': '{}' is not a number", finger, arg, v.trim()))
            };
            Ok(Point::new(coord(x)?, coord(y)?))
        })
        .collect()
}

/// Parses every checkpoint argument in order.
pub fn parse_checkpoints(args: &[String]) -> Result<Vec<Vec<Point>>, String> {
    args.iter().map(|a| parse_checkpoint(a)).collect()
}
