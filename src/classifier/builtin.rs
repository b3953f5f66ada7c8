//! Built-in rule tables for the Spanish tutoring assistant.
//!
//! Order matters: fixed phrases first, then the multiplication-table rule,
//! then topics. All patterns are written against normalized (lowercase,
//! accent-free) text.

use regex::Error;

use super::rule::PatternRule;

pub const GREETING: &str = "¡Hola! 😊 ¿En qué puedo ayudarte hoy? Puedo ayudarte con matemáticas, ciencias, historia, o cualquier tema que estés estudiando.";

pub const HELP: &str = "¡Por supuesto! Estoy aquí para ayudarte. ¿Qué necesitas aprender hoy? Puedes preguntarme sobre:\n\n• 📚 Tareas escolares\n• 🔢 Matemáticas\n• 🌍 Ciencias\n• 📖 Historia\n• 🎨 Arte\n\n¡Solo dime qué tema te interesa!";

pub const FAREWELL: &str = "¡Hasta luego! 👋 Fue un gusto ayudarte. ¡Recuerda que siempre estaré aquí cuando necesites aprender algo nuevo! ¡Que tengas un excelente día!";

pub const THANKS: &str = "¡De nada! 😊 Me alegra mucho poder ayudarte. Si tienes más preguntas, no dudes en preguntarme. ¡Estoy aquí para ayudarte a aprender!";

pub const IDENTITY: &str = "¡Hola! Soy tu tutor AI de Sócrates. 🤖📚 Estoy aquí para ayudarte a aprender de forma divertida. Puedo explicarte temas de la escuela, ayudarte con tareas, y responder tus preguntas. ¡Piensa en mí como un amigo que siempre está listo para ayudarte a estudiar!";

pub const CAPABILITIES: &str = "Puedo ayudarte con muchas cosas:\n\n📚 **Tareas escolares**: Te explico paso a paso\n🔢 **Matemáticas**: Sumas, restas, multiplicaciones, fracciones\n🌍 **Ciencias**: Planetas, animales, plantas, el cuerpo humano\n📖 **Historia**: Eventos importantes, personajes históricos\n🎨 **Arte y creatividad**: Ideas para proyectos\n\n¡Solo pregúntame lo que necesites saber!";

pub const MULTIPLICATION_TABLES: &str = "Las tablas de multiplicar son súper útiles. ¡Te ayudo con la que necesites! 📊\n\nPor ejemplo, la tabla del 2:\n• 2 × 1 = 2\n• 2 × 2 = 4\n• 2 × 3 = 6\n• 2 × 4 = 8\n• 2 × 5 = 10\n\n¡Dime qué tabla específica quieres practicar!";

pub const PRIMES: &str = "Los números primos son números especiales que solo se pueden dividir entre 1 y ellos mismos. 🔢\n\nPor ejemplo:\n• 2 es primo (solo se divide entre 1 y 2)\n• 3 es primo (solo se divide entre 1 y 3)\n• 5 es primo (solo se divide entre 1 y 5)\n• 7 es primo (solo se divide entre 1 y 7)\n\nPero 4 NO es primo porque se puede dividir entre 1, 2 y 4. ¡Los primeros números primos son: 2, 3, 5, 7, 11, 13, 17, 19, 23, 29!";

pub const PLANETS: &str = "Los planetas de nuestro Sistema Solar son 8: 🌍\n\n1. **Mercurio** - El más pequeño y cercano al Sol ☀️\n2. **Venus** - El más caliente\n3. **Tierra** - ¡Nuestro hogar! 🌍\n4. **Marte** - El planeta rojo\n5. **Júpiter** - El más grande\n6. **Saturno** - El de los anillos\n7. **Urano** - Está inclinado\n8. **Neptuno** - El más lejano\n\n¡Puedes recordarlos con: \"Mi Vieja Tía Marta Jamás Supo Usar Nada\"!";

pub const MULTIPLICATION: &str = "La multiplicación es sumar el mismo número varias veces. ✖️\n\nPor ejemplo:\n• 3 × 4 = 3 + 3 + 3 + 3 = 12\n• 2 × 5 = 2 + 2 + 2 + 2 + 2 = 10\n\n¡Es como hacer grupos! Si tienes 3 grupos de 4 manzanas 🍎, tienes 12 manzanas en total.";

pub const DIVISION: &str = "La división es repartir en partes iguales. ➗\n\nPor ejemplo:\n• 12 ÷ 3 = 4 (si tienes 12 dulces y los repartes entre 3 amigos, cada uno recibe 4)\n• 10 ÷ 2 = 5 (si tienes 10 galletas y las divides en 2 grupos, cada grupo tiene 5)\n\n¡Es lo contrario de la multiplicación!";

pub const FRACTIONS: &str = "Las fracciones son partes de un entero. 🍕\n\nPor ejemplo:\n• 1/2 = la mitad (como media pizza)\n• 1/4 = un cuarto (como un pedazo de un pastel dividido en 4)\n• 3/4 = tres cuartos (como 3 pedazos de 4)\n\nEl número de arriba (numerador) dice cuántas partes tienes, y el de abajo (denominador) dice en cuántas partes se dividió el entero.";

pub const PHOTOSYNTHESIS: &str = "La fotosíntesis es cómo las plantas hacen su propia comida. 🌱\n\nLas plantas necesitan:\n• ☀️ Luz del sol\n• 💧 Agua (por las raíces)\n• 🌬️ Dióxido de carbono (del aire)\n\nCon estos ingredientes, las hojas verdes (con clorofila) convierten todo en:\n• 🍃 Glucosa (su alimento)\n• 💨 Oxígeno (que nosotros respiramos)\n\n¡Por eso las plantas son tan importantes para nosotros!";

pub const WATER_CYCLE: &str = "El ciclo del agua es un viaje circular que hace el agua. 💧\n\n1. **Evaporación** ☀️: El sol calienta el agua de ríos y mares, y se convierte en vapor\n2. **Condensación** ☁️: El vapor sube y se enfría, formando nubes\n3. **Precipitación** 🌧️: Las gotas en las nubes se hacen pesadas y caen como lluvia\n4. **Infiltración** 🏞️: El agua llega a ríos, lagos y bajo la tierra\n\n¡Y vuelve a empezar! Por eso nunca se acaba el agua en la Tierra.";

/// Greeting, help, farewell, thanks, identity and capability phrases.
pub fn phrase_rules() -> Vec<PatternRule> {
    vec![
        PatternRule::exact(
            "greeting",
            ["hola", "hi", "hey", "buenas", "buenos dias", "buenas tardes", "buenas noches"],
            GREETING,
        ),
        PatternRule::exact("help", ["ayuda", "help", "ayudame", "necesito ayuda"], HELP),
        PatternRule::exact("farewell", ["adios", "bye", "chau", "hasta luego", "nos vemos"], FAREWELL),
        PatternRule::exact("thanks", ["gracias", "thanks", "muchas gracias", "te agradezco"], THANKS),
        PatternRule::exact("identity", ["quien eres", "que eres", "como te llamas"], IDENTITY),
        PatternRule::exact(
            "capabilities",
            ["que puedes hacer", "que sabes hacer", "como funciona esto"],
            CAPABILITIES,
        ),
    ]
}

/// Educational rules: single-topic patterns, multiplication tables, then the
/// topic catalogue.
pub fn educational_rules() -> Result<Vec<PatternRule>, Error> {
    Ok(vec![
        PatternRule::regex_set("tema_primos", &[r"numeros? primos?"], PRIMES)?,
        PatternRule::regex_set("tema_multiplicacion", &[r"multiplicacion"], MULTIPLICATION)?,
        PatternRule::regex_set(
            "tema_planetas",
            &[r"los planetas", r"planetas del sistema solar"],
            PLANETS,
        )?,
        PatternRule::regex_set("tema_fracciones", &[r"fracciones"], FRACTIONS)?,
        PatternRule::regex_set("tema_division", &[r"division"], DIVISION)?,
        PatternRule::regex_set(
            "tablas",
            &[r"tabla del? \d+", r"tabla de multiplicar"],
            MULTIPLICATION_TABLES,
        )?,
        PatternRule::topic(
            "numeros_primos",
            &["numero", "primo", "primos", "numeros"],
            &[
                r"primer?o?s?\s+numeros?",
                r"numeros?\s+primos?",
                r"que\s+(son|es)\s+(los?\s+)?numeros?\s+primos?",
                r"explica(me)?\s+(los?\s+)?numeros?\s+primos?",
                r"dime\s+.*\s+primos?",
                r"habla(me)?\s+.*\s+primos?",
            ],
            PRIMES,
        )?,
        PatternRule::topic(
            "planetas",
            &["planeta", "planetas", "sistema", "solar"],
            &[
                r"planetas?\s+(del\s+)?sistema\s+solar",
                r"(cuales|cuantos)\s+son\s+los\s+planetas?",
                r"dime\s+los\s+planetas?",
                r"nombra(me)?\s+los\s+planetas?",
                r"que\s+planetas?\s+hay",
            ],
            PLANETS,
        )?,
        PatternRule::topic(
            "multiplicacion",
            &["multiplicar", "multiplicacion", "multiplica"],
            &[
                r"que\s+es\s+(la\s+)?multiplicaci?on",
                r"como\s+se?\s+multiplica",
                r"explica(me)?\s+(la\s+)?multiplicaci?on",
                r"para\s+que\s+sirve\s+(la\s+)?multiplicaci?on",
            ],
            MULTIPLICATION,
        )?,
        PatternRule::topic(
            "division",
            &["dividir", "division", "divide"],
            &[
                r"que\s+es\s+(la\s+)?divisi?on",
                r"como\s+se?\s+divide",
                r"explica(me)?\s+(la\s+)?divisi?on",
                r"para\s+que\s+sirve\s+(la\s+)?divisi?on",
            ],
            DIVISION,
        )?,
        PatternRule::topic(
            "fracciones",
            &["fraccion", "fracciones", "quebrado", "parte"],
            &[
                r"que\s+(son|es)\s+(las?\s+)?fracciones?",
                r"explica(me)?\s+(las?\s+)?fracciones?",
                r"como\s+funcionan?\s+(las?\s+)?fracciones?",
                r"para\s+que\s+sirven?\s+(las?\s+)?fracciones?",
            ],
            FRACTIONS,
        )?,
        PatternRule::topic(
            "fotosintesis",
            &["fotosintesis", "planta", "plantas"],
            &[
                r"que\s+es\s+(la\s+)?fotosintesis",
                r"como\s+hacen?\s+fotosintesis",
                r"como\s+comen?\s+(las\s+)?plantas?",
                r"como\s+se\s+alimentan?\s+(las\s+)?plantas?",
            ],
            PHOTOSYNTHESIS,
        )?,
        PatternRule::topic(
            "ciclo_del_agua",
            &["agua", "ciclo", "lluvia"],
            &[
                r"ciclo\s+del?\s+agua",
                r"como\s+se\s+forma\s+(la\s+)?lluvia",
                r"por\s+que\s+llueve",
                r"de\s+donde\s+viene\s+(la\s+)?lluvia",
            ],
            WATER_CYCLE,
        )?,
    ])
}

/// Every built-in rule in evaluation order.
pub fn rules() -> Result<Vec<PatternRule>, Error> {
    let mut all = phrase_rules();
    all.extend(educational_rules()?);
    Ok(all)
}
