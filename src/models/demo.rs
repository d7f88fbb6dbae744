// src/models/demo.rs

use serde::Serialize;
use utoipa::ToSchema;

// Superfície de demonstração: dados fixos, somente leitura, fora do ciclo
// de vida. Espelha o servidor de prototipagem para que o frontend consiga
// desenvolver telas sem banco populado.

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Designacion {
    pub id: i32,
    pub estudiante: String,
    pub materia: String,
    pub tutor: String,
    pub fecha_asignacion: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Estudiante {
    pub id: i32,
    pub nombre: String,
    pub carrera: String,
    pub anio: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Materia {
    pub id: i32,
    pub nombre: String,
    pub codigo: String,
    pub creditos: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notificacion {
    pub id: i32,
    pub titulo: String,
    pub mensaje: String,
    pub fecha: String,
    pub leida: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistorialEstudiante {
    pub id: i32,
    pub estudiante: String,
    pub evento: String,
    pub fecha: String,
}

pub fn sample_designaciones() -> Vec<Designacion> {
    vec![
        Designacion {
            id: 1,
            estudiante: "Lucía Fernández".into(),
            materia: "Metodología de la Investigación".into(),
            tutor: "Dr. Ramiro Soto".into(),
            fecha_asignacion: "2025-02-03".into(),
        },
        Designacion {
            id: 2,
            estudiante: "Jorge Mamani".into(),
            materia: "Sistemas Distribuidos".into(),
            tutor: "Ing. Paola Rivas".into(),
            fecha_asignacion: "2025-02-10".into(),
        },
    ]
}

pub fn sample_estudiantes() -> Vec<Estudiante> {
    vec![
        Estudiante {
            id: 1,
            nombre: "Lucía Fernández".into(),
            carrera: "Ingeniería de Sistemas".into(),
            anio: 4,
        },
        Estudiante {
            id: 2,
            nombre: "Jorge Mamani".into(),
            carrera: "Ingeniería Industrial".into(),
            anio: 3,
        },
        Estudiante {
            id: 3,
            nombre: "Carla Quispe".into(),
            carrera: "Ingeniería de Sistemas".into(),
            anio: 5,
        },
    ]
}

pub fn sample_materias() -> Vec<Materia> {
    vec![
        Materia {
            id: 1,
            nombre: "Metodología de la Investigación".into(),
            codigo: "INV-301".into(),
            creditos: 6,
        },
        Materia {
            id: 2,
            nombre: "Sistemas Distribuidos".into(),
            codigo: "SIS-502".into(),
            creditos: 8,
        },
    ]
}

pub fn sample_notificaciones() -> Vec<Notificacion> {
    vec![
        Notificacion {
            id: 1,
            titulo: "Reporte pendiente".into(),
            mensaje: "Tu segundo reporte de avance vence el 30 de junio.".into(),
            fecha: "2025-06-15".into(),
            leida: false,
        },
        Notificacion {
            id: 2,
            titulo: "Beca aprobada".into(),
            mensaje: "Tu postulación a beca de investigación fue aprobada.".into(),
            fecha: "2025-01-20".into(),
            leida: true,
        },
    ]
}

pub fn sample_historial() -> Vec<HistorialEstudiante> {
    vec![
        HistorialEstudiante {
            id: 1,
            estudiante: "Lucía Fernández".into(),
            evento: "Entrega de reporte 1 aprobada".into(),
            fecha: "2025-04-12".into(),
        },
        HistorialEstudiante {
            id: 2,
            estudiante: "Jorge Mamani".into(),
            evento: "Designación de tutor".into(),
            fecha: "2025-02-10".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amostras_sao_estaveis_e_serializam_em_camel_case() {
        let json = serde_json::to_value(sample_designaciones()).unwrap();
        assert_eq!(json[0]["fechaAsignacion"], "2025-02-03");
        assert_eq!(sample_estudiantes().len(), 3);
        assert_eq!(sample_materias()[1].codigo, "SIS-502");
    }
}
