// Demo script offered by the SPA's "try a sample" action.

/// Three scenes: a dialogue scene, a silent exterior, and a monologue with a parenthetical.
pub const SAMPLE_SCRIPT: &str = "\
INT. COFFEE SHOP - MORNING

A cozy neighborhood coffee shop. Morning light streams through large windows.

SARAH (30s), a freelance illustrator, sketches in a worn notebook.

JAMES (O.S.)
Excuse me, is this seat taken?

SARAH
(looking up)
Oh, no. Go ahead.

EXT. CITY STREET - CONTINUOUS

James exits the coffee shop, glancing back through the window.

He hesitates, then walks on into the morning crowd.

INT. JAMES'S APARTMENT - NIGHT

James sits at his desk, staring at a napkin with a phone number.

JAMES
(to himself)
Just call her.
It's only a phone call.
";
