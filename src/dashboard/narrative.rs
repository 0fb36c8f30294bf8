use crate::models::View;

const DAILY_PATTERN: &str = "\
Both stations show a bimodal daily cycle: a smaller morning peak around 08:00-09:00 \
and a stronger evening peak around 21:00-22:00, where hourly means reach about 130. \
The lowest concentrations occur between 13:00 and 15:00. Dongsi and Wanliu follow almost \
the same curve, so the pattern is regional rather than tied to one site.

Across the year, concentrations are highest in late winter and spring, peaking in March \
(above 140 at both stations), and lowest from June to September (below 90), when heavier \
rainfall washes particles out of the air.";

const WEATHER_EFFECTS: &str = "\
Temperature (TEMP) and dew point (DEWP) are negatively correlated with PM10 at both \
stations: about -0.27 (Dongsi) and -0.22 (Wanliu) for TEMP, and about -0.055 and -0.028 \
for DEWP. Air pressure (PRES) shows a weak positive correlation, about 0.074 (Dongsi) \
and 0.029 (Wanliu).

PM10 tends to rise when the temperature drops below 0°C. Dew point follows a similar but \
noisier relationship. High-pressure conditions lean towards higher PM10. Both stations \
respond the same way, so the weather acts on the whole region.";

const FURTHER_ANALYSIS: &str = "\
Every temperature category shows the evening/night peak (about 18:00-22:00) and the \
early-afternoon trough (about 12:00-15:00), so daily activity and boundary-layer dynamics \
matter alongside temperature.

Cold conditions (<0°C) give the sharpest V-shaped midday dip and the highest night-time \
values, around 200 at Dongsi and 160 at Wanliu. Dongsi is generally higher than Wanliu \
under cold conditions, pointing to site-specific dispersion. Warm conditions (>20°C) give \
the flattest, most stable daily curve.";

const CONCLUSION: &str = "\
Daily pattern: PM10 is bimodal with a morning rush-hour peak and a stronger evening peak, \
when traffic combines with a stable night-time boundary layer (temperature inversion). \
Midday lows follow the deeper mixing layer and thermal turbulence.

Seasonal pattern: December-March run 30-50% higher than June-August. Summer lows are \
attributed to wet deposition.

Weather: low temperatures trap pollutants near the ground; high pressure brings stable air \
and poor mixing, so pollutants accumulate.

Recommendations: encourage public transport; tighten monitoring of industrial emissions \
from December to March; build an early-warning system driven by meteorological forecasts, \
especially for cold, high-pressure spells; support the move away from carbon-based fuels; \
publish exposure guidance for children, the elderly and people with respiratory disease.";

/// Static commentary shown alongside each view
pub fn insight(view: View) -> &'static str {
    match view {
        View::DailyPattern => DAILY_PATTERN,
        View::WeatherEffects => WEATHER_EFFECTS,
        View::FurtherAnalysis => FURTHER_ANALYSIS,
        View::Conclusion => CONCLUSION,
    }
}
